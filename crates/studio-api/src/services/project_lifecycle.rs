//! Project lifecycle: ties image files on disk to project rows.
//!
//! Files are published before rows are written, and removed before rows are
//! deleted. File removal is best-effort throughout; a leftover file is
//! preferable to a failed request.

use studio_core::{
    models::{ProjectImage, ProjectResponse},
    AppError,
};
use studio_db::{ProjectImageRepository, ProjectRepository};
use studio_processing::{ImageIngestor, StoredImageDescriptor};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::upload::ProjectForm;
use crate::state::AppState;

pub struct ProjectLifecycleService {
    projects: ProjectRepository,
    images: ProjectImageRepository,
    ingestor: ImageIngestor,
}

impl ProjectLifecycleService {
    pub fn new(
        projects: ProjectRepository,
        images: ProjectImageRepository,
        ingestor: ImageIngestor,
    ) -> Self {
        Self {
            projects,
            images,
            ingestor,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.project_repository.clone(),
            state.db.project_image_repository.clone(),
            state.media.ingestor.clone(),
        )
    }

    /// Publish the uploaded images, then insert the project with its image
    /// rows (uploads first, then `imageUrls`).
    pub async fn create(&self, form: ProjectForm) -> Result<ProjectResponse, HttpAppError> {
        form.validate_fields()?;

        if let Some(url) = form
            .image_urls
            .iter()
            .find(|url| self.ingestor.is_managed_url(url))
        {
            return Err(AppError::InvalidInput(format!(
                "imageUrls must not reference uploaded files: {}",
                url
            ))
            .into());
        }

        let descriptors = self.ingestor.ingest(form.candidates).await?;
        let mut urls = published_paths(&descriptors);
        urls.extend(form.image_urls);

        match self.projects.create_with_images(form.fields, urls).await {
            Ok((project, images)) => {
                tracing::info!(
                    project_id = %project.id,
                    slug = %project.slug,
                    uploaded = descriptors.len(),
                    images = images.len(),
                    "Project created"
                );
                Ok(project.into_response(images))
            }
            Err(e) => {
                self.discard_published(&descriptors).await;
                Err(e.into())
            }
        }
    }

    /// Update the text fields and append newly uploaded images.
    ///
    /// Existing images are kept; `imageUrls` is ignored here because clients
    /// echo back the images the project already has.
    pub async fn update(
        &self,
        id: Uuid,
        form: ProjectForm,
    ) -> Result<ProjectResponse, HttpAppError> {
        form.validate_fields()?;

        if self.projects.get(id).await?.is_none() {
            return Err(project_not_found().into());
        }

        let descriptors = self.ingestor.ingest(form.candidates).await?;
        let urls = published_paths(&descriptors);

        match self.projects.update_with_images(id, form.fields, urls).await {
            Ok(Some((project, images))) => {
                tracing::info!(
                    project_id = %project.id,
                    uploaded = descriptors.len(),
                    images = images.len(),
                    "Project updated"
                );
                Ok(project.into_response(images))
            }
            Ok(None) => {
                // Deleted while the images were being processed
                self.discard_published(&descriptors).await;
                Err(project_not_found().into())
            }
            Err(e) => {
                self.discard_published(&descriptors).await;
                Err(e.into())
            }
        }
    }

    /// Remove every image file of the project, then the project row. Image
    /// rows follow through the cascade.
    pub async fn delete(&self, id: Uuid) -> Result<(), HttpAppError> {
        if self.projects.get(id).await?.is_none() {
            return Err(project_not_found().into());
        }

        let images = self.images.list_for_project(id).await?;
        self.ingestor
            .remove_all(images.iter().map(|image| image.image_url.as_str()).collect::<Vec<_>>())
            .await;

        if !self.projects.delete(id).await? {
            return Err(project_not_found().into());
        }

        tracing::info!(project_id = %id, images = images.len(), "Project deleted");
        Ok(())
    }

    /// Remove one image file, then its row
    pub async fn delete_image(
        &self,
        project_id: Uuid,
        image_id: Uuid,
    ) -> Result<ProjectImage, HttpAppError> {
        let image = self
            .images
            .get(project_id, image_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        self.ingestor.remove(&image.image_url).await;
        self.images.delete(image.id).await?;

        tracing::info!(project_id = %project_id, image_id = %image_id, "Project image deleted");
        Ok(image)
    }

    async fn discard_published(&self, descriptors: &[StoredImageDescriptor]) {
        if descriptors.is_empty() {
            return;
        }
        tracing::warn!(
            files = descriptors.len(),
            "Removing published images after failed database write"
        );
        self.ingestor
            .remove_all(descriptors.iter().map(|d| d.relative_path.as_str()).collect::<Vec<_>>())
            .await;
    }
}

fn published_paths(descriptors: &[StoredImageDescriptor]) -> Vec<String> {
    descriptors
        .iter()
        .map(|descriptor| descriptor.relative_path.clone())
        .collect()
}

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}
