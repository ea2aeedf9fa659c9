use crate::core::assignment_matrix::AssignmentMatrixResult;
use crate::utils::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementMatrixResult {
    pub matrix: Vec<Vec<f64>>,
    pub plot_point_ids: Vec<String>,
    pub normalized: bool,
}

/// One off-diagonal entry of an agreement matrix, `row < column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarPair {
    pub row: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_point_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_point_b: Option<String>,
    pub similarity: f64,
}

impl AgreementMatrixResult {
    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    /// Upper-triangle pairs with `similarity >= threshold`, most similar
    /// first; ties keep row-major order.
    pub fn similar_pairs(&self, threshold: f64) -> Vec<SimilarPair> {
        let mut pairs = Vec::new();
        for (row, values) in self.matrix.iter().enumerate() {
            for (column, &similarity) in values.iter().enumerate().skip(row + 1) {
                if similarity >= threshold {
                    pairs.push(SimilarPair {
                        row,
                        column,
                        plot_point_a: self.plot_point_ids.get(row).cloned(),
                        plot_point_b: self.plot_point_ids.get(column).cloned(),
                        similarity,
                    });
                }
            }
        }

        // sort_by 是穩定排序，同分時維持掃描順序
        pairs.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        pairs
    }
}

/// Plot point × plot point similarity built from an assignment matrix.
///
/// The raw value is the dot product of two rows. With cosine normalization
/// each entry is divided by the product of the row magnitudes, which bounds
/// it to `[0, 1]`. A plot point with no assignments has similarity 0 with
/// everything, itself included; collaborator agreement in
/// [`crate::core::jaccard`] uses the opposite convention for empty sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgreementMatrixBuilder {
    normalize: bool,
}

impl AgreementMatrixBuilder {
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    pub fn build(&self, assignments: &AssignmentMatrixResult) -> Result<AgreementMatrixResult> {
        let rows = &assignments.matrix;
        let size = rows.len();
        let mut raw = vec![vec![0.0; size]; size];

        // 只算上三角再鏡射，保證結果完全對稱
        for i in 0..size {
            for j in i..size {
                let value = dot(&rows[i], &rows[j]);
                raw[i][j] = value;
                raw[j][i] = value;
            }
        }

        if let Some(i) = raw.iter().position(|row| row.iter().any(|v| !v.is_finite())) {
            return Err(InsightsError::ProcessingError {
                message: format!(
                    "agreement for plot point '{}' is not finite; assignment weights are out of range",
                    assignments.plot_point_ids.get(i).map(String::as_str).unwrap_or("?")
                ),
            });
        }

        let matrix = if self.normalize {
            cosine_normalize(&raw)
        } else {
            raw
        };

        tracing::debug!(
            "Built {}x{} agreement matrix (cosine: {})",
            size,
            size,
            self.normalize
        );

        Ok(AgreementMatrixResult {
            matrix,
            plot_point_ids: assignments.plot_point_ids.clone(),
            normalized: self.normalize,
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn cosine_normalize(raw: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let size = raw.len();
    let mut normalized = vec![vec![0.0; size]; size];
    // 先各自開根號再相乘，避免平方長度相乘時下溢或溢位
    let norms: Vec<f64> = (0..size).map(|i| raw[i][i].sqrt()).collect();

    for i in 0..size {
        if norms[i] <= 0.0 {
            continue;
        }
        normalized[i][i] = 1.0;
        for j in (i + 1)..size {
            let denominator = norms[i] * norms[j];
            if denominator <= 0.0 {
                continue;
            }
            let value = raw[i][j] / denominator;
            if !value.is_finite() {
                continue;
            }
            // Cauchy–Schwarz 保證落在 [0, 1]，clamp 只吸收浮點誤差
            let value = value.clamp(0.0, 1.0);
            normalized[i][j] = value;
            normalized[j][i] = value;
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment_result(matrix: Vec<Vec<f64>>) -> AssignmentMatrixResult {
        let plot_point_ids = (1..=matrix.len()).map(|i| format!("p{}", i)).collect();
        let columns = matrix.first().map(Vec::len).unwrap_or(0);
        AssignmentMatrixResult {
            matrix,
            category_ids: (0..columns).map(|k| format!("cat-{}", k)).collect(),
            plot_point_ids,
        }
    }

    #[test]
    fn test_raw_dot_products() {
        let input = assignment_result(vec![vec![2.0, 1.0, 0.0], vec![2.0, 0.0, 1.0]]);

        let result = AgreementMatrixBuilder::new(false).build(&input).unwrap();

        // 對角線是每列的平方長度
        assert_eq!(result.matrix, vec![vec![5.0, 4.0], vec![4.0, 5.0]]);
        assert!(!result.normalized);
    }

    #[test]
    fn test_unit_rows_raw() {
        let input = assignment_result(vec![vec![1.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]]);

        let result = AgreementMatrixBuilder::new(false).build(&input).unwrap();

        assert_eq!(result.matrix, vec![vec![2.0, 1.0], vec![1.0, 2.0]]);
    }

    #[test]
    fn test_cosine_normalization_bounds() {
        let input = assignment_result(vec![
            vec![2.0, 1.0, 0.0],
            vec![2.0, 0.0, 1.0],
            vec![0.0, 0.0, 3.0],
        ]);

        let result = AgreementMatrixBuilder::new(true).build(&input).unwrap();

        for i in 0..3 {
            assert_eq!(result.matrix[i][i], 1.0);
            for j in 0..3 {
                assert!(result.matrix[i][j] >= 0.0 && result.matrix[i][j] <= 1.0);
                assert_eq!(result.matrix[i][j], result.matrix[j][i]);
            }
        }
        assert!((result.matrix[0][1] - 0.8).abs() < 1e-12);
        assert_eq!(result.matrix[0][2], 0.0);
    }

    #[test]
    fn test_empty_row_has_zero_similarity_including_itself() {
        let input = assignment_result(vec![vec![1.0, 0.0], vec![0.0, 0.0]]);

        let result = AgreementMatrixBuilder::new(true).build(&input).unwrap();

        assert_eq!(result.matrix, vec![vec![1.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_parallel_rows_cap_at_one() {
        let input = assignment_result(vec![vec![0.1, 0.2, 0.3], vec![0.3, 0.6, 0.9]]);

        let result = AgreementMatrixBuilder::new(true).build(&input).unwrap();

        assert!(result.matrix[0][1] <= 1.0);
        assert!((result.matrix[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_similar_pairs_sorted_and_thresholded() {
        let result = AgreementMatrixResult {
            matrix: vec![
                vec![1.0, 0.4, 0.9],
                vec![0.4, 1.0, 0.9],
                vec![0.9, 0.9, 1.0],
            ],
            plot_point_ids: vec!["p1".into(), "p2".into(), "p3".into()],
            normalized: true,
        };

        let pairs = result.similar_pairs(0.5);

        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].row, pairs[0].column), (0, 2));
        assert_eq!((pairs[1].row, pairs[1].column), (1, 2));
        assert_eq!(pairs[0].plot_point_a.as_deref(), Some("p1"));
        assert_eq!(pairs[0].plot_point_b.as_deref(), Some("p3"));
    }

    #[test]
    fn test_empty_matrix() {
        let result = AgreementMatrixBuilder::new(true).build(&assignment_result(vec![])).unwrap();
        assert_eq!(result.size(), 0);
        assert!(result.similar_pairs(0.0).is_empty());
    }

    #[test]
    fn test_tiny_disjoint_rows_stay_orthogonal() {
        // 平方長度約 1e-320，兩者相乘會下溢成 0
        let input = assignment_result(vec![vec![1e-160, 0.0], vec![0.0, 1e-160]]);

        let result = AgreementMatrixBuilder::new(true).build(&input).unwrap();

        assert_eq!(result.matrix, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_tiny_overlapping_rows_are_parallel() {
        let input = assignment_result(vec![vec![1e-160, 0.0], vec![2e-160, 0.0]]);

        let result = AgreementMatrixBuilder::new(true).build(&input).unwrap();

        // 次正規數精度有限，只要求接近 1
        assert!(result.matrix[0][1] > 0.99 && result.matrix[0][1] <= 1.0);
        assert!(result.matrix.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_overflowing_rows_are_rejected() {
        let input = assignment_result(vec![vec![1e200, 0.0], vec![0.0, 1e200]]);

        for normalize in [false, true] {
            let err = AgreementMatrixBuilder::new(normalize).build(&input).unwrap_err();
            assert!(matches!(err, InsightsError::ProcessingError { ref message } if message.contains("p1")));
        }
    }
}
