use crate::domain::batch::VariantBatch;
use crate::utils::numeric::{capped_percentage, ratio_or_zero, round1};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorCoverage {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Distinct plot points this collaborator tagged at least once.
    pub completed: usize,
    pub percentage: f64,
    /// Distinct category ids this collaborator used across the variant.
    pub categories_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub total_plot_points: usize,
    /// Sum over plot points of the number of distinct collaborators on it.
    pub total_assignments: usize,
    pub total_contributors: usize,
    pub total_capacity: usize,
    pub completion_percentage: f64,
    pub average_assignments_per_plot_point: f64,
    /// One entry per roster member, sorted by email.
    pub collaborators: Vec<CollaboratorCoverage>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageCalculator;

impl CoverageCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, batch: &VariantBatch) -> CoverageReport {
        let plot_points = batch.plot_points();
        let total_plot_points = plot_points.len();
        let total_contributors = batch.collaborators().len();
        let total_capacity = total_plot_points * total_contributors;

        let mut total_assignments = 0usize;
        let mut completed: BTreeMap<&str, usize> = BTreeMap::new();
        let mut categories: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for plot_point in plot_points {
            // 同一位協作者在同一個 plot point 上只算一次
            let contributors: BTreeSet<&str> = plot_point
                .assignments
                .iter()
                .map(|a| a.collaborator_email.as_str())
                .collect();
            total_assignments += contributors.len();

            for email in contributors {
                *completed.entry(email).or_insert(0) += 1;
            }
            for assignment in &plot_point.assignments {
                categories
                    .entry(assignment.collaborator_email.as_str())
                    .or_default()
                    .insert(assignment.category_id.as_str());
            }
        }

        let collaborators = batch
            .collaborators()
            .iter()
            .map(|collaborator| {
                let done = completed.get(collaborator.email.as_str()).copied().unwrap_or(0);
                CollaboratorCoverage {
                    email: collaborator.email.clone(),
                    display_name: collaborator.display_name.clone(),
                    completed: done,
                    percentage: capped_percentage(done as f64, total_plot_points as f64),
                    categories_used: categories
                        .get(collaborator.email.as_str())
                        .map(BTreeSet::len)
                        .unwrap_or(0),
                }
            })
            .collect();

        if total_contributors == 0 && total_plot_points > 0 {
            tracing::warn!("⚠️ Roster is empty; completion is reported as 0%");
        }

        CoverageReport {
            total_plot_points,
            total_assignments,
            total_contributors,
            total_capacity,
            completion_percentage: capped_percentage(
                total_assignments as f64,
                total_capacity as f64,
            ),
            average_assignments_per_plot_point: round1(ratio_or_zero(
                total_assignments as f64,
                total_plot_points as f64,
            )),
            collaborators,
        }
    }
}
