use axum_test::multipart::{MultipartForm, Part};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([180, 150, 120]))
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode fixture image");
    buffer
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(file_name).mime_type(mime_type)
}

/// A form with every required text field filled in
pub fn project_form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title)
        .add_text("location", "Valparaíso, Chile")
        .add_text("completionDate", "2024")
        .add_text("description", "House on a steep hillside lot.")
}
