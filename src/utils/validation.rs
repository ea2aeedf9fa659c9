use crate::utils::error::{InsightsError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Lower-cases and trims an email so it can be used as a roster key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes `email` and rejects anything that does not look like `name@domain.tld`.
pub fn validate_email(email: &str) -> Result<String> {
    let normalized = normalize_email(email);
    if !EMAIL_PATTERN.is_match(&normalized) {
        return Err(InsightsError::MalformedEmail {
            email: email.to_string(),
        });
    }
    Ok(normalized)
}

/// Smallest non-zero collaborator weight.
pub const MIN_POSITIVE_WEIGHT: f64 = 1e-6;
/// Largest collaborator weight; keeps squared row magnitudes finite.
pub const MAX_WEIGHT: f64 = 1e6;

/// Accepts `0` or a finite weight in `[MIN_POSITIVE_WEIGHT, MAX_WEIGHT]`.
pub fn validate_weight(email: &str, weight: f64) -> Result<()> {
    let in_range = weight == 0.0 || (MIN_POSITIVE_WEIGHT..=MAX_WEIGHT).contains(&weight);
    if !weight.is_finite() || !in_range {
        return Err(InsightsError::InvalidWeight {
            email: email.to_string(),
            weight,
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(InsightsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(InsightsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_output_formats(
    field_name: &str,
    formats: &[String],
    allowed_formats: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_formats.iter().copied().collect();

    for format in formats {
        if !allowed_set.contains(format.as_str()) {
            return Err(InsightsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    allowed_formats.join(", ")
                ),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| InsightsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InsightsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不屬於任何區間
    if !(value >= min && value <= max) {
        return Err(InsightsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Alpha@Example.COM ").unwrap(),
            "alpha@example.com"
        );
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.example.com").is_err());
        assert!(validate_email("two words@example.com").is_err());
        assert!(validate_email("alpha@localhost").is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight("a@example.com", 0.0).is_ok());
        assert!(validate_weight("a@example.com", 2.5).is_ok());
        assert!(validate_weight("a@example.com", -0.1).is_err());
        assert!(validate_weight("a@example.com", f64::NAN).is_err());
        assert!(validate_weight("a@example.com", f64::INFINITY).is_err());
        assert!(validate_weight("a@example.com", MIN_POSITIVE_WEIGHT).is_ok());
        assert!(validate_weight("a@example.com", MAX_WEIGHT).is_ok());
        assert!(validate_weight("a@example.com", 1e-160).is_err());
        assert!(validate_weight("a@example.com", 1e200).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["json".to_string(), "csv".to_string()];
        assert!(validate_output_formats("load.output_formats", &formats, &["json", "csv", "tsv"]).is_ok());

        let invalid = vec!["xlsx".to_string()];
        assert!(validate_output_formats("load.output_formats", &invalid, &["json", "csv", "tsv"]).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("agreement.similarity_threshold", 0.5, 0.0, 1.0).is_ok());
        assert!(validate_range("agreement.similarity_threshold", 1.5, 0.0, 1.0).is_err());
        assert!(validate_range("agreement.similarity_threshold", f64::NAN, 0.0, 1.0).is_err());
    }
}
