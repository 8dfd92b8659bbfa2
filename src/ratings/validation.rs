use super::types::KEY_SEPARATOR;
use crate::error::ValidationError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// Check a score lies in `[MIN_SCORE, MAX_SCORE]`.
pub fn validate_score(field: &'static str, value: i64) -> Result<u8, ValidationError> {
    if value < MIN_SCORE as i64 || value > MAX_SCORE as i64 {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }
    Ok(value as u8)
}

/// Parse user-typed text into a score. Surrounding whitespace is ignored.
pub fn parse_score(field: &'static str, input: &str) -> Result<u8, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotAnInteger {
        field,
        input: trimmed.to_string(),
    })?;
    validate_score(field, value)
}

/// Trim a key component and reject empty values. Label and site codes
/// additionally may not contain the key separator.
pub fn validate_key_part(
    field: &'static str,
    value: &str,
    forbid_separator: bool,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if forbid_separator && trimmed.contains(KEY_SEPARATOR) {
        return Err(ValidationError::ReservedSeparator {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_score_accepts_bounds() {
        assert_eq!(validate_score("quality_of_work", 1), Ok(1));
        assert_eq!(validate_score("quality_of_work", 10), Ok(10));
    }

    #[test]
    fn test_validate_score_rejects_outside() {
        assert!(validate_score("quality_of_work", 0).is_err());
        assert!(validate_score("quality_of_work", 11).is_err());
        assert!(validate_score("quality_of_work", i64::MAX).is_err());
    }

    #[test]
    fn test_parse_score_trims() {
        assert_eq!(parse_score("timeliness", " 7 "), Ok(7));
    }

    #[test]
    fn test_parse_score_empty() {
        assert_eq!(
            parse_score("timeliness", "  "),
            Err(ValidationError::Empty { field: "timeliness" })
        );
    }

    #[test]
    fn test_parse_score_not_a_number() {
        assert_eq!(
            parse_score("timeliness", "7.5"),
            Err(ValidationError::NotAnInteger {
                field: "timeliness",
                input: "7.5".to_string()
            })
        );
    }

    #[test]
    fn test_parse_score_out_of_range() {
        assert!(matches!(
            parse_score("responsiveness", "42"),
            Err(ValidationError::OutOfRange { value: 42, .. })
        ));
    }

    #[test]
    fn test_validate_key_part() {
        assert_eq!(validate_key_part("label", " HPI ", true), Ok("HPI".to_string()));
        assert!(validate_key_part("label", "", true).is_err());
        assert!(validate_key_part("label", "H_PI", true).is_err());
        assert_eq!(
            validate_key_part("technician", "Mary_Ann", false),
            Ok("Mary_Ann".to_string())
        );
    }
}
