use crate::domain::model::{Collaborator, CollaboratorCategory, PlotPoint, VariantSnapshot};
use crate::utils::error::{InsightsError, Result};
use crate::utils::validation::validate_email;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Validated input for the calculators. Every email is normalized and
/// malformed data is rejected on construction, so an empty batch always
/// means empty data.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantBatch {
    variant_id: Option<String>,
    plot_points: Vec<PlotPoint>,
    collaborators: Vec<Collaborator>,
    categories: Vec<CollaboratorCategory>,
}

impl VariantBatch {
    /// Validates and normalizes a batch.
    ///
    /// Plot points keep their input order. The roster is deduplicated by
    /// normalized email (first occurrence wins) and sorted by email.
    pub fn new(plot_points: Vec<PlotPoint>, collaborators: Vec<Collaborator>) -> Result<Self> {
        let mut known_ids = HashSet::with_capacity(plot_points.len());
        for plot_point in &plot_points {
            if !known_ids.insert(plot_point.id.as_str()) {
                return Err(InsightsError::DuplicatePlotPoint {
                    plot_point_id: plot_point.id.clone(),
                });
            }
        }

        let mut normalized_points = Vec::with_capacity(plot_points.len());
        for plot_point in &plot_points {
            let mut normalized = plot_point.clone();
            for assignment in &mut normalized.assignments {
                if assignment.plot_point_id != plot_point.id {
                    if !known_ids.contains(assignment.plot_point_id.as_str()) {
                        return Err(InsightsError::UnknownPlotPoint {
                            plot_point_id: assignment.plot_point_id.clone(),
                            category_id: assignment.category_id.clone(),
                        });
                    }
                    return Err(InsightsError::ValidationError {
                        message: format!(
                            "assignment of category '{}' is listed under plot point '{}' but references '{}'",
                            assignment.category_id, plot_point.id, assignment.plot_point_id
                        ),
                    });
                }
                assignment.collaborator_email = validate_email(&assignment.collaborator_email)?;
            }
            normalized_points.push(normalized);
        }

        let mut roster: BTreeMap<String, Collaborator> = BTreeMap::new();
        for collaborator in collaborators {
            let email = validate_email(&collaborator.email)?;
            roster.entry(email.clone()).or_insert(Collaborator {
                email,
                ..collaborator
            });
        }

        let unlisted: BTreeSet<&str> = normalized_points
            .iter()
            .flat_map(|p| p.assignments.iter())
            .map(|a| a.collaborator_email.as_str())
            .filter(|email| !roster.contains_key(*email))
            .collect();
        if !unlisted.is_empty() {
            tracing::warn!(
                "⚠️ {} collaborator(s) made assignments but are not on the roster: {:?}",
                unlisted.len(),
                unlisted
            );
        }

        tracing::debug!(
            "Validated batch: {} plot points, {} collaborators",
            normalized_points.len(),
            roster.len()
        );

        Ok(Self {
            variant_id: None,
            plot_points: normalized_points,
            collaborators: roster.into_values().collect(),
            categories: Vec::new(),
        })
    }

    pub fn with_variant_id(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Attaches the collaborator categories referenced by assignments,
    /// used only to label exported columns.
    pub fn with_categories(mut self, categories: Vec<CollaboratorCategory>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(categories.len());
        for mut category in categories {
            category.collaborator_email = validate_email(&category.collaborator_email)?;
            normalized.push(category);
        }
        self.categories = normalized;
        Ok(self)
    }

    pub fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    pub fn plot_points(&self) -> &[PlotPoint] {
        &self.plot_points
    }

    /// Roster sorted by normalized email.
    pub fn collaborators(&self) -> &[Collaborator] {
        &self.collaborators
    }

    pub fn collaborator_emails(&self) -> Vec<String> {
        self.collaborators.iter().map(|c| c.email.clone()).collect()
    }

    /// Display label for a category id: the registered category name,
    /// then any assignment's `category_name`, then the id itself.
    pub fn category_label<'a>(&'a self, category_id: &'a str) -> &'a str {
        if let Some(category) = self.categories.iter().find(|c| c.id == category_id) {
            return &category.name;
        }
        self.plot_points
            .iter()
            .flat_map(|p| p.assignments.iter())
            .find(|a| a.category_id == category_id && !a.category_name.is_empty())
            .map(|a| a.category_name.as_str())
            .unwrap_or(category_id)
    }

    pub fn is_empty(&self) -> bool {
        self.plot_points.is_empty()
    }
}

impl VariantSnapshot {
    pub fn into_batch(self) -> Result<VariantBatch> {
        let batch = VariantBatch::new(self.plot_points, self.collaborators)?
            .with_categories(self.categories)?;
        Ok(match self.variant_id {
            Some(id) => batch.with_variant_id(id),
            None => batch,
        })
    }
}
