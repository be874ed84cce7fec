//! Project API integration tests.
//!
//! Run with: `cargo test -p studio-api --test projects_test -- --ignored`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::{image_part, jpeg, png, project_form};
use helpers::setup_test_app;
use image::GenericImageView;
use serde_json::{json, Value};

async fn create_project(app: &helpers::TestApp, form: axum_test::multipart::MultipartForm) -> Value {
    let response = app
        .client()
        .post("/api/projects")
        .authorization_bearer(app.admin_token())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

fn image_urls(project: &Value) -> Vec<String> {
    project["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|url| url.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_project_normalizes_images() {
    let app = setup_test_app().await;

    let form = project_form("Casa del Lago")
        .add_part("images", image_part(jpeg(3000, 2000), "facade.jpg", "image/jpeg"))
        .add_part("images", image_part(png(400, 300), "plan.png", "image/png"));
    let project = create_project(&app, form).await;

    assert_eq!(project["slug"], "casa-del-lago");
    assert_eq!(project["completionDate"], "2024");

    let urls = image_urls(&project);
    assert_eq!(urls.len(), 2);
    assert_eq!(app.published_files(), 2);
    assert_eq!(app.staged_batches(), 0);

    let mut dimensions = Vec::new();
    for url in &urls {
        assert!(url.starts_with("/uploads/images-"), "{url}");
        assert!(url.ends_with(".webp"), "{url}");

        let served = app.client().get(url).await;
        assert_eq!(served.status_code(), StatusCode::OK);
        let decoded = image::load_from_memory(served.as_bytes()).unwrap();
        dimensions.push(decoded.dimensions());
    }
    assert_eq!(dimensions, vec![(1620, 1080), (400, 300)]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_external_image_urls_are_attached_after_uploads() {
    let app = setup_test_app().await;

    let form = project_form("Torre Sur")
        .add_text(
            "imageUrls",
            json!(["https://cdn.example.com/render.jpg"]).to_string(),
        )
        .add_part("images", image_part(png(64, 64), "a.png", "image/png"));
    let project = create_project(&app, form).await;

    let urls = image_urls(&project);
    assert_eq!(urls.len(), 2);
    assert!(urls[0].starts_with("/uploads/"));
    assert_eq!(urls[1], "https://cdn.example.com/render.jpg");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_rejected_batch_creates_no_project() {
    let app = setup_test_app().await;

    let mut form = project_form("Casa Norte");
    for i in 0..10 {
        let part = if i == 6 {
            image_part(b"plain text".to_vec(), "notes.txt", "text/plain")
        } else {
            image_part(png(32, 24), &format!("photo{i}.png"), "image/png")
        };
        form = form.add_part("images", part);
    }

    let response = app
        .client()
        .post("/api/projects")
        .authorization_bearer(app.admin_token())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let list: Value = app.client().get("/api/projects").await.json();
    assert_eq!(list.as_array().unwrap().len(), 0);
    assert_eq!(app.published_files(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_undecodable_image_is_server_error_and_writes_nothing() {
    let app = setup_test_app().await;

    let form = project_form("Casa Norte")
        .add_part("images", image_part(png(32, 32), "ok.png", "image/png"))
        .add_part(
            "images",
            image_part(b"GIF89a but not really".to_vec(), "bad.gif", "image/gif"),
        );

    let response = app
        .client()
        .post("/api/projects")
        .authorization_bearer(app.admin_token())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to process uploaded images");
    assert_eq!(app.published_files(), 0);
    assert_eq!(app.staged_batches(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_slug_conflicts_and_cleans_up_files() {
    let app = setup_test_app().await;

    create_project(&app, project_form("Casa Norte")).await;

    let response = app
        .client()
        .post("/api/projects")
        .authorization_bearer(app.admin_token())
        .multipart(
            project_form("casa   NORTE")
                .add_part("images", image_part(png(16, 16), "a.png", "image/png")),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(app.published_files(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_get_by_id_and_slug() {
    let app = setup_test_app().await;
    let project = create_project(&app, project_form("Loft Centro")).await;
    let id = project["id"].as_str().unwrap();

    let by_id = app.client().get(&format!("/api/projects/{id}")).await;
    assert_eq!(by_id.status_code(), StatusCode::OK);

    let by_slug: Value = app.client().get("/api/projects/slug/loft-centro").await.json();
    assert_eq!(by_slug["id"], id);

    let missing = app.client().get("/api/projects/slug/nope").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_is_newest_first() {
    let app = setup_test_app().await;
    create_project(&app, project_form("Primero")).await;
    create_project(&app, project_form("Segundo")).await;

    let list: Value = app.client().get("/api/projects").await.json();
    let titles: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Segundo", "Primero"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_appends_images() {
    let app = setup_test_app().await;
    let project = create_project(
        &app,
        project_form("Casa Norte").add_part("images", image_part(png(16, 16), "a.png", "image/png")),
    )
    .await;
    let id = project["id"].as_str().unwrap();

    let response = app
        .client()
        .put(&format!("/api/projects/{id}"))
        .authorization_bearer(app.admin_token())
        .multipart(
            project_form("Casa Norte Renovada")
                .add_part("images", image_part(png(16, 16), "b.png", "image/png")),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["slug"], "casa-norte-renovada");
    let urls = image_urls(&updated);
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0], image_urls(&project)[0]);
    assert_eq!(app.published_files(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_missing_project_is_not_found_and_writes_nothing() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .put(&format!("/api/projects/{}", uuid::Uuid::new_v4()))
        .authorization_bearer(app.admin_token())
        .multipart(
            project_form("Fantasma").add_part("images", image_part(png(16, 16), "a.png", "image/png")),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.published_files(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_project_tolerates_missing_files() {
    let app = setup_test_app().await;
    let mut form = project_form("Casa Norte");
    for i in 0..3 {
        form = form.add_part("images", image_part(png(16, 16), &format!("{i}.png"), "image/png"));
    }
    let project = create_project(&app, form).await;
    let id = project["id"].as_str().unwrap();
    let urls = image_urls(&project);

    // One file disappears out of band
    let missing = urls[1].trim_start_matches("/uploads/");
    std::fs::remove_file(app.upload_dir().join(missing)).unwrap();
    assert_eq!(app.published_files(), 2);

    let response = app
        .client()
        .delete(&format!("/api/projects/{id}"))
        .authorization_bearer(app.admin_token())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.published_files(), 0);

    let gone = app.client().get(&format!("/api/projects/{id}")).await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_single_image() {
    let app = setup_test_app().await;
    let project = create_project(
        &app,
        project_form("Casa Norte")
            .add_part("images", image_part(png(16, 16), "a.png", "image/png"))
            .add_part("images", image_part(png(16, 16), "b.png", "image/png")),
    )
    .await;
    let project_id = project["id"].as_str().unwrap();
    let image_id = project["image_records"][0]["id"].as_str().unwrap();

    let other = create_project(&app, project_form("Otra Casa")).await;
    let wrong_project = app
        .client()
        .delete(&format!(
            "/api/projects/{}/images/{image_id}",
            other["id"].as_str().unwrap()
        ))
        .authorization_bearer(app.admin_token())
        .await;
    assert_eq!(wrong_project.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .delete(&format!("/api/projects/{project_id}/images/{image_id}"))
        .authorization_bearer(app.admin_token())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["image_id"], image_id);
    assert_eq!(app.published_files(), 1);

    let remaining: Value = app
        .client()
        .get(&format!("/api/projects/{project_id}"))
        .await
        .json();
    assert_eq!(image_urls(&remaining).len(), 1);
}
