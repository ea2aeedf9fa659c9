pub mod agreement_matrix;
pub mod assignment_matrix;
pub mod coverage;
pub mod engine;
pub mod export;
pub mod jaccard;
pub mod metrics;
pub mod pipeline;

pub use crate::domain::batch::VariantBatch;
pub use crate::domain::model::{
    CategoryAssignment, Collaborator, CollaboratorCategory, InsightsOutput, PlotPoint,
    VariantSnapshot,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
