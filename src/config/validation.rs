use super::schema::Config;
use crate::ratings::types::KEY_SEPARATOR;
use std::collections::HashSet;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.labels.is_empty() {
        errors.push("labels: at least one label is required".to_string());
    }
    check_codes("labels", &config.labels, &mut errors);
    check_codes("sites", &config.sites, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Labels and site codes become parts of the stored key
fn check_codes(field: &str, values: &[String], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (i, value) in values.iter().enumerate() {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.push(format!("{}[{}]: must not be empty", field, i));
        } else if trimmed.contains(KEY_SEPARATOR) {
            errors.push(format!(
                "{}[{}]: '{}' must not contain '{}'",
                field, i, trimmed, KEY_SEPARATOR
            ));
        } else if !seen.insert(trimmed) {
            errors.push(format!("{}[{}]: duplicate '{}'", field, i, trimmed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(labels: &[&str], sites: &[&str]) -> Config {
        Config {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            sites: sites.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_valid_sites() {
        assert!(validate_config(&config_with(&["HPI"], &["ALF", "BOS"])).is_ok());
    }

    #[test]
    fn test_no_labels() {
        let errors = validate_config(&config_with(&[], &[])).unwrap_err();
        assert!(errors[0].contains("at least one label"));
    }

    #[test]
    fn test_separator_in_site() {
        let errors = validate_config(&config_with(&["HPI"], &["AL_F"])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("sites[0]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let errors =
            validate_config(&config_with(&["HPI", " HPI", ""], &["ALF", "B_S"])).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("labels[1]: duplicate"));
        assert!(errors[1].contains("labels[2]: must not be empty"));
        assert!(errors[2].contains("sites[1]"));
    }
}
