//! Publisher stage: uploads the cover image and creates the post file.

use std::sync::Arc;

use pipeline::format::{compose_post, post_path, Frontmatter, SiteLayout};
use pipeline::{
    Article, Category, Clock, ContentRepository, ErrorKind, PipelineError, PublishedPost,
};
use tracing::{info, instrument, warn};

use crate::image::ImageAsset;

/// Writes one post (and optionally its image) to the target repository.
#[derive(Clone)]
pub struct Publisher {
    repo: Arc<dyn ContentRepository>,
    clock: Arc<dyn Clock>,
    layout: SiteLayout,
}

impl Publisher {
    pub fn new(repo: Arc<dyn ContentRepository>, clock: Arc<dyn Clock>, layout: SiteLayout) -> Self {
        Self {
            repo,
            clock,
            layout,
        }
    }

    /// Publishes `article` under `category`.
    ///
    /// `image` is consumed: its local file is deleted when this call returns,
    /// whether or not publishing succeeded. A failed image upload is logged and
    /// the post is published without `featured_image`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PublishConflict`] if the post path already exists.
    /// Nothing is overwritten and an already uploaded image stays in place.
    #[instrument(skip_all, fields(title = article.title(), category = %category))]
    pub async fn publish(
        &self,
        article: &Article,
        category: Category,
        image: Option<ImageAsset>,
    ) -> Result<PublishedPost, PipelineError> {
        let featured_image = match &image {
            Some(asset) => match self.upload_image(asset).await {
                Ok(public_path) => Some(public_path),
                Err(e) => {
                    warn!(error = %e, "Image upload failed; publishing without an image");
                    None
                }
            },
            None => None,
        };

        let now = self.clock.now();
        let frontmatter = Frontmatter {
            title: article.title().to_string(),
            date: now,
            category,
            featured_image: featured_image.clone(),
        };
        let document = compose_post(&frontmatter, article.body(), article.tags());
        let path = post_path(article.title(), now);
        let message = format!("feat: Add post '{}'", article.title());

        let created = self
            .repo
            .create_file(&path, &message, document.as_bytes())
            .await?;
        info!(path = %created.path, url = %created.html_url, "Post published");

        Ok(PublishedPost {
            path: created.path,
            html_url: created.html_url,
            featured_image,
        })
    }

    /// Uploads the image unless a file already exists at its repository path.
    ///
    /// Returns the site-absolute path for the frontmatter.
    async fn upload_image(&self, asset: &ImageAsset) -> Result<String, PipelineError> {
        let repo_path = self.layout.image_repo_path(asset.file_name());
        let public_path = self.layout.image_public_path(asset.file_name());

        if self.repo.get_file(&repo_path).await?.is_some() {
            info!(path = %repo_path, "Image already present; skipping upload");
            return Ok(public_path);
        }

        let bytes = asset.read().await?;
        let message = format!("feat: Add image {}", asset.file_name());
        match self.repo.create_file(&repo_path, &message, &bytes).await {
            Ok(_) => {
                info!(path = %repo_path, "Image uploaded");
                Ok(public_path)
            }
            // Created between the existence check and the upload.
            Err(e) if e.kind() == ErrorKind::PublishConflict => Ok(public_path),
            Err(e) => Err(e),
        }
    }
}
