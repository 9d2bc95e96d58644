use async_trait::async_trait;

use crate::{
    domain::Announcement,
    error::Result,
    repository::{AnnouncementRepository, JsonStore},
};

#[async_trait]
impl AnnouncementRepository for JsonStore<Announcement> {
    async fn list(&self) -> Result<Vec<Announcement>> {
        self.load().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        Ok(self.load().await?.into_iter().find(|a| a.id == id))
    }

    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        self.prepend(announcement.clone()).await?;
        Ok(announcement)
    }

    async fn delete(&self, id: i64) -> Result<Option<Announcement>> {
        Ok(self.remove_where(|a| a.id == id).await?.into_iter().next())
    }
}
