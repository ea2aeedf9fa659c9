use crate::domain::batch::VariantBatch;
use crate::utils::numeric::{ratio_or_zero, round1};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementPair {
    pub collaborator_a: String,
    pub collaborator_b: String,
    /// Raw Jaccard similarity in `[0, 1]`.
    pub agreement: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaccardReport {
    /// Matrix row/column order, sorted lexicographically.
    pub collaborator_emails: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    /// Mean of the strict upper triangle, as a percentage.
    pub average_agreement: f64,
    pub highest_agreement_pair: Option<AgreementPair>,
}

/// Jaccard similarity of the plot point sets two collaborators touched,
/// `|A ∩ B| / |A ∪ B|`, or 0 when both are empty. Self-agreement is always
/// 1, even for a collaborator who touched nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardAgreementCalculator;

impl JaccardAgreementCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, batch: &VariantBatch) -> JaccardReport {
        // batch 的名冊已依 email 排序
        let emails = batch.collaborator_emails();

        let mut touched: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for plot_point in batch.plot_points() {
            for assignment in &plot_point.assignments {
                touched
                    .entry(assignment.collaborator_email.as_str())
                    .or_default()
                    .insert(plot_point.id.as_str());
            }
        }

        let empty = BTreeSet::new();
        let sets: Vec<&BTreeSet<&str>> = emails
            .iter()
            .map(|email| touched.get(email.as_str()).unwrap_or(&empty))
            .collect();

        let size = emails.len();
        let mut matrix = vec![vec![0.0; size]; size];
        for a in 0..size {
            matrix[a][a] = 1.0;
            for b in (a + 1)..size {
                let value = jaccard(sets[a], sets[b]);
                matrix[a][b] = value;
                matrix[b][a] = value;
            }
        }

        let mut upper_sum = 0.0;
        let mut upper_count = 0usize;
        let mut highest: Option<(usize, usize, f64)> = None;
        for a in 0..size {
            for b in (a + 1)..size {
                let value = matrix[a][b];
                upper_sum += value;
                upper_count += 1;
                // 嚴格大於：同分時保留最先掃描到的組合
                let is_better = match highest {
                    Some((_, _, best)) => value > best,
                    None => true,
                };
                if is_better {
                    highest = Some((a, b, value));
                }
            }
        }

        let average_agreement = round1(ratio_or_zero(upper_sum, upper_count as f64) * 100.0);
        let highest_agreement_pair = highest.map(|(a, b, value)| AgreementPair {
            collaborator_a: emails[a].clone(),
            collaborator_b: emails[b].clone(),
            agreement: value,
            percentage: round1(value * 100.0),
        });

        tracing::debug!(
            "Computed Jaccard agreement for {} collaborators (average {}%)",
            size,
            average_agreement
        );

        JaccardReport {
            collaborator_emails: emails,
            matrix,
            average_agreement,
            highest_agreement_pair,
        }
    }
}

fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    ratio_or_zero(intersection as f64, union as f64)
}
