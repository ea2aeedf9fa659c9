use crate::core::assignment_matrix::{AssignmentMatrixOptions, CollaboratorWeights};
use crate::core::ConfigProvider;
use crate::utils::error::{InsightsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_range, Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

pub const SUPPORTED_FORMATS: [&str; 3] = ["json", "csv", "tsv"];
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub agreement: AgreementConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    pub category_order: Option<Vec<String>>,
    pub normalize_within_plot_point: Option<bool>,
    /// Email → weight. Unlisted collaborators weigh 1.0.
    pub weights: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgreementConfig {
    pub normalize: Option<bool>,
    pub similarity_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

impl InsightsConfig {
    /// 只有輸入與輸出路徑的最小配置，其餘使用預設值
    pub fn new(input_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            source: SourceConfig {
                input_path: input_path.into(),
            },
            matrix: MatrixConfig::default(),
            agreement: AgreementConfig::default(),
            load: LoadConfig {
                output_path: output_path.into(),
                output_formats: vec!["json".to_string()],
                compression: None,
            },
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InsightsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| InsightsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("source.input_path", &self.source.input_path)?;
        validate_path("load.output_path", &self.load.output_path)?;

        if self.load.output_formats.is_empty() {
            return Err(InsightsError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }
        validate_output_formats("load.output_formats", &self.load.output_formats, &SUPPORTED_FORMATS)?;

        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validate_non_empty_string("load.compression.filename", &compression.filename)?;
            }
        }

        if let Some(order) = &self.matrix.category_order {
            for id in order {
                validate_non_empty_string("matrix.category_order", id)?;
            }
        }

        validate_range(
            "agreement.similarity_threshold",
            self.similarity_threshold(),
            0.0,
            1.0,
        )?;

        // 權重錯誤必須在設定階段就擋下
        self.collaborator_weights()?;

        Ok(())
    }

    pub fn collaborator_weights(&self) -> Result<CollaboratorWeights> {
        match &self.matrix.weights {
            Some(weights) => CollaboratorWeights::new(
                weights.iter().map(|(email, weight)| (email.as_str(), *weight)),
            ),
            None => Ok(CollaboratorWeights::default()),
        }
    }

    pub fn normalize_within_plot_point(&self) -> bool {
        self.matrix.normalize_within_plot_point.unwrap_or(false)
    }

    pub fn cosine_agreement(&self) -> bool {
        self.agreement.normalize.unwrap_or(false)
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.agreement
            .similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn compression_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl ConfigProvider for InsightsConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.compression_filename()
    }

    fn matrix_options(&self) -> Result<AssignmentMatrixOptions> {
        let mut options = AssignmentMatrixOptions::default()
            .with_weights(self.collaborator_weights()?)
            .normalized_within_plot_point(self.normalize_within_plot_point());
        if let Some(order) = &self.matrix.category_order {
            options = options.with_category_order(order.iter().cloned());
        }
        Ok(options)
    }

    fn normalize_agreement(&self) -> bool {
        self.cosine_agreement()
    }

    fn similarity_threshold(&self) -> f64 {
        InsightsConfig::similarity_threshold(self)
    }
}

impl Validate for InsightsConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
