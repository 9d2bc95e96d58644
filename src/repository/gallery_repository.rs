use async_trait::async_trait;

use crate::{
    domain::{normalize_category, GalleryPatch, GalleryPhoto},
    error::Result,
    repository::{GalleryRepository, JsonStore},
};

#[async_trait]
impl GalleryRepository for JsonStore<GalleryPhoto> {
    async fn list(&self) -> Result<Vec<GalleryPhoto>> {
        self.load().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GalleryPhoto>> {
        Ok(self.load().await?.into_iter().find(|p| p.id == id))
    }

    async fn create(&self, photo: GalleryPhoto) -> Result<GalleryPhoto> {
        self.prepend(photo.clone()).await?;
        Ok(photo)
    }

    async fn update(&self, id: i64, patch: GalleryPatch) -> Result<Option<GalleryPhoto>> {
        self.update_where(
            |p| p.id == id,
            move |photo| {
                if let Some(title) = patch.title {
                    photo.title = title.trim().to_string();
                }
                if let Some(category) = patch.category {
                    photo.category = normalize_category(Some(&category));
                }
            },
        )
        .await
    }

    async fn delete(&self, id: i64) -> Result<Option<GalleryPhoto>> {
        Ok(self.remove_where(|p| p.id == id).await?.into_iter().next())
    }
}
