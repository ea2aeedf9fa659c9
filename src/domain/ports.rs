use crate::core::assignment_matrix::AssignmentMatrixOptions;
use crate::domain::batch::VariantBatch;
use crate::domain::model::InsightsOutput;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// Archive filename when output bundling is enabled.
    fn archive_name(&self) -> Option<&str>;
    fn matrix_options(&self) -> Result<AssignmentMatrixOptions>;
    fn normalize_agreement(&self) -> bool;
    fn similarity_threshold(&self) -> f64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<VariantBatch>;
    async fn transform(&self, batch: VariantBatch) -> Result<InsightsOutput>;
    async fn load(&self, output: InsightsOutput) -> Result<String>;
}
