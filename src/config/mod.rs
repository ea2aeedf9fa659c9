pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::validate_required_field;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::{CompressionConfig, InsightsConfig};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "variant-insights")]
#[command(about = "Coverage and agreement analytics for collaboratively categorized plot points")]
pub struct CliConfig {
    /// Path to a TOML configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Variant snapshot JSON
    #[arg(short, long)]
    pub input: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output formats: json, csv, tsv
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub category_order: Vec<String>,

    /// Collaborator weight as EMAIL=WEIGHT, repeatable
    #[arg(long = "weight", value_parser = parse_weight)]
    pub weights: Vec<(String, f64)>,

    #[arg(long, help = "Normalize each plot point row to unit mass")]
    pub normalize_rows: bool,

    #[arg(long, help = "Cosine-normalize the plot point agreement matrix")]
    pub cosine: bool,

    #[arg(long, help = "Minimum similarity for reported plot point pairs")]
    pub threshold: Option<f64>,

    #[arg(long, help = "Bundle all outputs into a ZIP archive with this filename")]
    pub zip: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Validate inputs and print the plan without writing anything")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and applies command line overrides.
    pub fn resolve(&self) -> Result<InsightsConfig> {
        let mut config = match &self.config {
            Some(path) => InsightsConfig::from_file(path)?,
            None => {
                let input = validate_required_field("input", &self.input)?;
                InsightsConfig::new(input.clone(), "./output")
            }
        };

        if let Some(input) = &self.input {
            config.source.input_path = input.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if !self.format.is_empty() {
            config.load.output_formats = self.format.clone();
        }
        if !self.category_order.is_empty() {
            config.matrix.category_order = Some(self.category_order.clone());
        }
        if !self.weights.is_empty() {
            let weights = config.matrix.weights.get_or_insert_with(Default::default);
            for (email, weight) in &self.weights {
                weights.insert(email.clone(), *weight);
            }
        }
        if self.normalize_rows {
            config.matrix.normalize_within_plot_point = Some(true);
        }
        if self.cosine {
            config.agreement.normalize = Some(true);
        }
        if let Some(threshold) = self.threshold {
            config.agreement.similarity_threshold = Some(threshold);
        }
        if let Some(filename) = &self.zip {
            config.load.compression = Some(CompressionConfig {
                enabled: true,
                filename: filename.clone(),
            });
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn parse_weight(raw: &str) -> std::result::Result<(String, f64), String> {
    let (email, weight) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected EMAIL=WEIGHT, got '{}'", raw))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    Ok((email.trim().to_string(), weight))
}
