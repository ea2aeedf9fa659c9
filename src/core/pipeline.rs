use crate::core::agreement_matrix::AgreementMatrixBuilder;
use crate::core::assignment_matrix::AssignmentMatrixBuilder;
use crate::core::export::{render_tables, Delimited};
use crate::core::metrics::MetricsAggregator;
use crate::core::{ConfigProvider, InsightsOutput, Pipeline, Storage, VariantBatch};
use crate::domain::model::VariantSnapshot;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Reads a variant snapshot, computes its insights and writes the exports.
pub struct SnapshotPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SnapshotPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    /// Every file the load stage produces, in a stable order.
    fn render_files(&self, output: &InsightsOutput) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            if format == "json" {
                let report = serde_json::to_string_pretty(output)?;
                files.push(("report.json".to_string(), report.into_bytes()));
            } else if let Some(flavour) = Delimited::from_format(format) {
                for (name, contents) in render_tables(output, flavour)? {
                    files.push((name, contents.into_bytes()));
                }
            } else {
                tracing::warn!("⚠️ Skipping unsupported output format: {}", format);
            }
        }
        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SnapshotPipeline<S, C> {
    async fn extract(&self) -> Result<VariantBatch> {
        tracing::debug!("Reading snapshot from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        let snapshot: VariantSnapshot = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            "Snapshot contains {} plot points and {} collaborators",
            snapshot.plot_points.len(),
            snapshot.collaborators.len()
        );

        let batch = snapshot.into_batch()?;
        if batch.is_empty() {
            tracing::warn!("⚠️ Snapshot has no plot points, metrics will be zeroed");
        }
        Ok(batch)
    }

    async fn transform(&self, batch: VariantBatch) -> Result<InsightsOutput> {
        let options = self.config.matrix_options()?;
        if !options.collaborator_weights.is_empty() {
            tracing::debug!(
                "Applying custom weights for {} collaborator(s)",
                options.collaborator_weights.len()
            );
        }
        let assignment_builder = AssignmentMatrixBuilder::new(options);
        let assignment_matrix = assignment_builder.build(batch.plot_points());

        let agreement_matrix =
            AgreementMatrixBuilder::new(self.config.normalize_agreement()).build(&assignment_matrix)?;
        tracing::debug!(
            "Matrices ready: assignment {}x{}, agreement {}x{}",
            assignment_matrix.matrix.len(),
            assignment_matrix.columns(),
            agreement_matrix.size(),
            agreement_matrix.size()
        );
        let similar_pairs = agreement_matrix.similar_pairs(self.config.similarity_threshold());

        let metrics = MetricsAggregator::new().aggregate(&batch);

        let category_labels = assignment_matrix
            .category_ids
            .iter()
            .map(|id| batch.category_label(id).to_string())
            .collect();

        tracing::debug!(
            "Found {} plot point pairs at or above similarity {}",
            similar_pairs.len(),
            self.config.similarity_threshold()
        );

        Ok(InsightsOutput {
            variant_id: batch.variant_id().map(str::to_string),
            metrics,
            assignment_matrix,
            agreement_matrix,
            similar_pairs,
            category_labels,
        })
    }

    async fn load(&self, output: InsightsOutput) -> Result<String> {
        let files = self.render_files(&output)?;

        if let Some(archive_name) = self.config.archive_name() {
            tracing::debug!("Creating ZIP archive with {} files", files.len() + 1);

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                for (name, contents) in &files {
                    zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                    zip.write_all(contents)?;
                }

                // manifest 帶時間戳，report 本身保持可重現
                let manifest = serde_json::json!({
                    "variantId": output.variant_id,
                    "generatedAt": chrono::Utc::now().to_rfc3339(),
                    "files": files.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
                });
                zip.start_file("manifest.json", SimpleFileOptions::default())?;
                zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

                zip.finish()?.into_inner()
            };

            let archive_path = self.output_file(archive_name);
            tracing::debug!("Writing ZIP archive ({} bytes) to {}", zip_data.len(), archive_path);
            self.storage.write_file(&archive_path, &zip_data).await?;
            return Ok(archive_path);
        }

        for (name, contents) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, contents.len());
            self.storage.write_file(&path, contents).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
