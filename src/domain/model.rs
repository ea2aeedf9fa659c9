use crate::core::agreement_matrix::{AgreementMatrixResult, SimilarPair};
use crate::core::assignment_matrix::AssignmentMatrixResult;
use crate::core::metrics::VariantInsightMetrics;
use serde::{Deserialize, Serialize};

/// "Collaborator X tagged plot point P with their own category C."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAssignment {
    pub plot_point_id: String,
    pub category_id: String,
    pub collaborator_email: String,
    #[serde(default)]
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPoint {
    pub id: String,
    /// 1-based position within the variant.
    pub order: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub assignments: Vec<CategoryAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Collaborator {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: None,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorCategory {
    pub id: String,
    pub collaborator_email: String,
    pub name: String,
}

/// Raw export of one variant as handed over by the persistence layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSnapshot {
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub plot_points: Vec<PlotPoint>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub categories: Vec<CollaboratorCategory>,
}

/// Everything the transform stage derives from one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    pub metrics: VariantInsightMetrics,
    pub assignment_matrix: AssignmentMatrixResult,
    pub agreement_matrix: AgreementMatrixResult,
    pub similar_pairs: Vec<SimilarPair>,
    /// Column labels for exports, parallel to `assignment_matrix.category_ids`.
    #[serde(skip)]
    pub category_labels: Vec<String>,
}
