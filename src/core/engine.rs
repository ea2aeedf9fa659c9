use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives a [`Pipeline`] through extract → transform → load.
pub struct InsightsEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> InsightsEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting insights run");

        tracing::info!("📥 Extracting snapshot...");
        let batch = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} plot points, {} collaborators",
            batch.plot_points().len(),
            batch.collaborators().len()
        );

        tracing::info!("🧮 Computing metrics...");
        let output = self.pipeline.transform(batch).await?;
        tracing::info!(
            "Completion {}%, average agreement {}%, {} similar plot point pairs",
            output.metrics.completion_percentage,
            output.metrics.average_agreement,
            output.similar_pairs.len()
        );

        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!(
            "Output saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
