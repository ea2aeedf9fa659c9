pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::config::toml_config::InsightsConfig;
pub use crate::core::{
    agreement_matrix::{AgreementMatrixBuilder, AgreementMatrixResult, SimilarPair},
    assignment_matrix::{
        AssignmentMatrixBuilder, AssignmentMatrixOptions, AssignmentMatrixResult,
        CollaboratorWeights,
    },
    coverage::{CollaboratorCoverage, CoverageCalculator, CoverageReport},
    engine::InsightsEngine,
    jaccard::{AgreementPair, JaccardAgreementCalculator, JaccardReport},
    metrics::{MetricsAggregator, VariantInsightMetrics},
    pipeline::SnapshotPipeline,
};
pub use crate::domain::batch::VariantBatch;
pub use crate::domain::model::{
    CategoryAssignment, Collaborator, CollaboratorCategory, InsightsOutput, PlotPoint,
    VariantSnapshot,
};
pub use crate::utils::error::{InsightsError, Result};
