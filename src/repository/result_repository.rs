use async_trait::async_trait;

use crate::{
    domain::AcademicResult,
    error::Result,
    repository::{JsonStore, ResultRepository},
};

#[async_trait]
impl ResultRepository for JsonStore<AcademicResult> {
    async fn list(&self) -> Result<Vec<AcademicResult>> {
        let mut results = self.load().await?;
        // Latest year first, then grade and subject for a stable table order
        results.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| a.grade.cmp(&b.grade))
                .then_with(|| a.subject.cmp(&b.subject))
        });
        Ok(results)
    }

    async fn create(&self, result: AcademicResult) -> Result<AcademicResult> {
        self.append(result.clone()).await?;
        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<Option<AcademicResult>> {
        Ok(self.remove_where(|r| r.id == id).await?.into_iter().next())
    }
}
