use crate::core::coverage::{CollaboratorCoverage, CoverageCalculator, CoverageReport};
use crate::core::jaccard::{AgreementPair, JaccardAgreementCalculator, JaccardReport};
use crate::domain::batch::VariantBatch;
use serde::{Deserialize, Serialize};

/// Per-variant report consumed by the presentation layer.
///
/// Contains no timestamps or other ambient state: the same batch always
/// yields an identical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInsightMetrics {
    pub total_plot_points: usize,
    pub collaborator_emails: Vec<String>,
    pub total_assignments: usize,
    pub total_contributors: usize,
    pub total_capacity: usize,
    pub completion_percentage: f64,
    pub average_assignments_per_plot_point: f64,
    pub collaborator_coverage: Vec<CollaboratorCoverage>,
    pub agreement_matrix: Vec<Vec<f64>>,
    pub average_agreement: f64,
    pub highest_agreement_pair: Option<AgreementPair>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAggregator {
    coverage: CoverageCalculator,
    agreement: JaccardAgreementCalculator,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregate(&self, batch: &VariantBatch) -> VariantInsightMetrics {
        let coverage = self.coverage.calculate(batch);
        let agreement = self.agreement.calculate(batch);
        Self::compose(coverage, agreement)
    }

    /// Packages already computed reports without recomputing anything.
    pub fn compose(coverage: CoverageReport, agreement: JaccardReport) -> VariantInsightMetrics {
        VariantInsightMetrics {
            total_plot_points: coverage.total_plot_points,
            collaborator_emails: agreement.collaborator_emails,
            total_assignments: coverage.total_assignments,
            total_contributors: coverage.total_contributors,
            total_capacity: coverage.total_capacity,
            completion_percentage: coverage.completion_percentage,
            average_assignments_per_plot_point: coverage.average_assignments_per_plot_point,
            collaborator_coverage: coverage.collaborators,
            agreement_matrix: agreement.matrix,
            average_agreement: agreement.average_agreement,
            highest_agreement_pair: agreement.highest_agreement_pair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CategoryAssignment, Collaborator, PlotPoint};

    fn sample_batch() -> VariantBatch {
        let tag = |plot_point_id: &str, category_id: &str, email: &str| CategoryAssignment {
            plot_point_id: plot_point_id.to_string(),
            category_id: category_id.to_string(),
            collaborator_email: email.to_string(),
            category_name: String::new(),
        };
        VariantBatch::new(
            vec![
                PlotPoint {
                    id: "p1".to_string(),
                    order: 1,
                    category: "Departure".to_string(),
                    assignments: vec![
                        tag("p1", "cat-a", "Beta@example.com"),
                        tag("p1", "cat-b", "alpha@example.com"),
                    ],
                },
                PlotPoint {
                    id: "p2".to_string(),
                    order: 2,
                    category: "Return".to_string(),
                    assignments: vec![tag("p2", "cat-c", "alpha@example.com")],
                },
            ],
            vec![
                Collaborator::new("beta@example.com"),
                Collaborator::new("alpha@example.com"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_aggregate_packages_both_reports() {
        let metrics = MetricsAggregator::new().aggregate(&sample_batch());

        assert_eq!(metrics.total_plot_points, 2);
        assert_eq!(
            metrics.collaborator_emails,
            vec!["alpha@example.com", "beta@example.com"]
        );
        assert_eq!(metrics.total_assignments, 3);
        assert_eq!(metrics.total_contributors, 2);
        assert_eq!(metrics.total_capacity, 4);
        assert_eq!(metrics.completion_percentage, 75.0);
        assert_eq!(metrics.average_assignments_per_plot_point, 1.5);
        assert_eq!(metrics.collaborator_coverage[0].percentage, 100.0);
        assert_eq!(metrics.collaborator_coverage[1].percentage, 50.0);
        assert_eq!(metrics.agreement_matrix, vec![vec![1.0, 0.5], vec![0.5, 1.0]]);
        assert_eq!(metrics.average_agreement, 50.0);
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let batch = sample_batch();
        let before = batch.clone();
        let aggregator = MetricsAggregator::new();

        let first = serde_json::to_string(&aggregator.aggregate(&batch)).unwrap();
        let second = serde_json::to_string(&aggregator.aggregate(&batch)).unwrap();

        assert_eq!(first, second);
        assert_eq!(batch, before);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let value = serde_json::to_value(MetricsAggregator::new().aggregate(&sample_batch())).unwrap();
        assert!(value.get("completionPercentage").is_some());
        assert!(value.get("highestAgreementPair").is_some());
        assert!(value["collaboratorCoverage"][0].get("categoriesUsed").is_some());
    }
}
