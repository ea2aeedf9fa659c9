use crate::core::coverage::CollaboratorCoverage;
use crate::domain::model::InsightsOutput;
use crate::utils::error::{InsightsError, Result};

/// Delimited text flavours supported by the load stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimited {
    Csv,
    Tsv,
}

impl Delimited {
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

/// Renders every table of `output` as `(filename, contents)`.
pub fn render_tables(output: &InsightsOutput, flavour: Delimited) -> Result<Vec<(String, String)>> {
    let ext = flavour.extension();
    let assignment = &output.assignment_matrix;
    let agreement = &output.agreement_matrix;
    let metrics = &output.metrics;

    Ok(vec![
        (
            format!("assignment_matrix.{}", ext),
            render_matrix(
                flavour,
                "plot_point",
                &assignment.plot_point_ids,
                &output.category_labels,
                &assignment.matrix,
            )?,
        ),
        (
            format!("agreement_matrix.{}", ext),
            render_matrix(
                flavour,
                "plot_point",
                &agreement.plot_point_ids,
                &agreement.plot_point_ids,
                &agreement.matrix,
            )?,
        ),
        (
            format!("collaborator_agreement.{}", ext),
            render_matrix(
                flavour,
                "collaborator",
                &metrics.collaborator_emails,
                &metrics.collaborator_emails,
                &metrics.agreement_matrix,
            )?,
        ),
        (
            format!("coverage.{}", ext),
            render_coverage(flavour, &metrics.collaborator_coverage)?,
        ),
    ])
}

pub fn render_matrix(
    flavour: Delimited,
    corner: &str,
    row_labels: &[String],
    column_labels: &[String],
    matrix: &[Vec<f64>],
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(flavour.delimiter())
        .from_writer(Vec::new());

    let mut header = Vec::with_capacity(column_labels.len() + 1);
    header.push(corner.to_string());
    header.extend(column_labels.iter().cloned());
    writer.write_record(&header)?;

    for (index, row) in matrix.iter().enumerate() {
        let label = row_labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(label);
        record.extend(row.iter().map(|value| value.to_string()));
        writer.write_record(&record)?;
    }

    finish(writer)
}

pub fn render_coverage(flavour: Delimited, coverage: &[CollaboratorCoverage]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(flavour.delimiter())
        .from_writer(Vec::new());

    writer.write_record(["email", "display_name", "completed", "percentage", "categories_used"])?;
    for entry in coverage {
        writer.write_record([
            entry.email.clone(),
            entry.display_name.clone().unwrap_or_default(),
            entry.completed.to_string(),
            entry.percentage.to_string(),
            entry.categories_used.to_string(),
        ])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| InsightsError::ProcessingError {
            message: format!("failed to flush delimited output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| InsightsError::ProcessingError {
        message: format!("delimited output is not UTF-8: {}", e),
    })
}
