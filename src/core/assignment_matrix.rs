use crate::domain::model::PlotPoint;
use crate::utils::error::Result;
use crate::utils::validation::{normalize_email, validate_email, validate_weight};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Per-collaborator multipliers, keyed by normalized email.
///
/// Weights are checked when the map is built: a negative, non-finite or
/// out-of-range weight never reaches a matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollaboratorWeights {
    weights: BTreeMap<String, f64>,
}

impl CollaboratorWeights {
    pub fn new<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut weights = BTreeMap::new();
        for (email, weight) in entries {
            let email = validate_email(email.as_ref())?;
            validate_weight(&email, weight)?;
            weights.insert(email, weight);
        }
        Ok(Self { weights })
    }

    /// Weight for `email`, or [`DEFAULT_WEIGHT`] when unmapped.
    pub fn weight_for(&self, email: &str) -> f64 {
        self.weights
            .get(&normalize_email(email))
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentMatrixOptions {
    pub category_order: Option<Vec<String>>,
    pub collaborator_weights: CollaboratorWeights,
    pub normalize_within_plot_point: bool,
}

impl AssignmentMatrixOptions {
    pub fn with_category_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_weights(mut self, weights: CollaboratorWeights) -> Self {
        self.collaborator_weights = weights;
        self
    }

    pub fn normalized_within_plot_point(mut self, normalize: bool) -> Self {
        self.normalize_within_plot_point = normalize;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentMatrixResult {
    pub matrix: Vec<Vec<f64>>,
    pub category_ids: Vec<String>,
    /// Row labels, in the same order as `matrix`.
    pub plot_point_ids: Vec<String>,
}

impl AssignmentMatrixResult {
    pub fn columns(&self) -> usize {
        self.category_ids.len()
    }
}

/// Builds the plot point × category matrix.
///
/// Rows follow the input order of plot points. Columns are the explicit
/// category order when one is given, otherwise the order in which category
/// ids first appear. Each cell sums the weights of the collaborators who put
/// that category on that plot point.
pub struct AssignmentMatrixBuilder {
    options: AssignmentMatrixOptions,
}

impl AssignmentMatrixBuilder {
    pub fn new(options: AssignmentMatrixOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, plot_points: &[PlotPoint]) -> AssignmentMatrixResult {
        let category_ids = self.resolve_columns(plot_points);

        // 同一個 id 重複出現時，以第一個欄位為準
        let mut column_index: HashMap<&str, usize> = HashMap::with_capacity(category_ids.len());
        for (index, id) in category_ids.iter().enumerate() {
            column_index.entry(id.as_str()).or_insert(index);
        }

        let weights = &self.options.collaborator_weights;
        let mut matrix = Vec::with_capacity(plot_points.len());

        for plot_point in plot_points {
            let mut row = vec![0.0; category_ids.len()];
            for assignment in &plot_point.assignments {
                if let Some(&column) = column_index.get(assignment.category_id.as_str()) {
                    row[column] += weights.weight_for(&assignment.collaborator_email);
                }
            }

            if self.options.normalize_within_plot_point {
                normalize_row(&mut row);
            }
            matrix.push(row);
        }

        tracing::debug!(
            "Built assignment matrix: {} plot points x {} categories (normalized rows: {})",
            matrix.len(),
            category_ids.len(),
            self.options.normalize_within_plot_point
        );

        AssignmentMatrixResult {
            matrix,
            category_ids,
            plot_point_ids: plot_points.iter().map(|p| p.id.clone()).collect(),
        }
    }

    fn resolve_columns(&self, plot_points: &[PlotPoint]) -> Vec<String> {
        if let Some(order) = &self.options.category_order {
            return order.clone();
        }

        let mut seen = std::collections::HashSet::new();
        let mut order = Vec::new();
        for assignment in plot_points.iter().flat_map(|p| p.assignments.iter()) {
            if seen.insert(assignment.category_id.as_str()) {
                order.push(assignment.category_id.clone());
            }
        }
        order
    }
}

/// Scales a row to unit mass. Rows summing to zero stay all zeros.
fn normalize_row(row: &mut [f64]) {
    let sum: f64 = row.iter().sum();
    if sum > 0.0 {
        for cell in row.iter_mut() {
            *cell /= sum;
        }
    }
}
