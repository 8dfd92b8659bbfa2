use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::{validate_key_part, validate_score};
use crate::error::ValidationError;

/// Separator used by the on-disk key encoding `"{label}_{site}_{technician}"`
pub const KEY_SEPARATOR: char = '_';

/// Identifies one rating bucket: a technician at a site under a label.
///
/// Label and site never contain `_`, so the encoded form decodes unambiguously
/// even when the technician name does.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingKey {
    label: String,
    site: String,
    technician: String,
}

impl RatingKey {
    pub fn new(
        label: impl AsRef<str>,
        site: impl AsRef<str>,
        technician: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let label = validate_key_part("label", label.as_ref(), true)?;
        let site = validate_key_part("site", site.as_ref(), true)?;
        let technician = validate_key_part("technician", technician.as_ref(), false)?;
        Ok(Self {
            label,
            site,
            technician,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn technician(&self) -> &str {
        &self.technician
    }

    /// Encode as the flat string key used in the persisted document
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.label,
            self.site,
            self.technician,
            sep = KEY_SEPARATOR
        )
    }

    /// Decode a flat string key; everything after the second `_` is the technician
    pub fn decode(encoded: &str) -> Option<Self> {
        let mut parts = encoded.splitn(3, KEY_SEPARATOR);
        let label = parts.next()?;
        let site = parts.next()?;
        let technician = parts.next()?;
        Self::new(label, site, technician).ok()
    }
}

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} [{}]", self.technician, self.site, self.label)
    }
}

/// One submitted rating. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub responsiveness: u8,
    pub quality_of_work: u8,
    pub timeliness: u8,
    /// Mean of the three components, fixed at creation
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Rating {
    /// Validate the three scores and build a rating stamped with the current time
    pub fn new(responsiveness: i64, quality: i64, timeliness: i64) -> Result<Self, ValidationError> {
        let responsiveness = validate_score("responsiveness", responsiveness)?;
        let quality_of_work = validate_score("quality_of_work", quality)?;
        let timeliness = validate_score("timeliness", timeliness)?;

        Ok(Self {
            responsiveness,
            quality_of_work,
            timeliness,
            average: mean_of(responsiveness, quality_of_work, timeliness),
            submitted_at: Some(Utc::now()),
        })
    }

    /// Check the components of a rating read back from storage
    pub fn check(&self) -> Result<(), ValidationError> {
        validate_score("responsiveness", self.responsiveness as i64)?;
        validate_score("quality_of_work", self.quality_of_work as i64)?;
        validate_score("timeliness", self.timeliness as i64)?;
        Ok(())
    }
}

fn mean_of(a: u8, b: u8, c: u8) -> f64 {
    (a as f64 + b as f64 + c as f64) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_average_is_mean() {
        let rating = Rating::new(8, 9, 7).unwrap();
        assert_eq!(rating.average, 8.0);
        assert!(rating.submitted_at.is_some());
    }

    #[test]
    fn test_rating_average_non_integer() {
        let rating = Rating::new(1, 1, 2).unwrap();
        assert!((rating.average - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rating_rejects_out_of_range() {
        let err = Rating::new(0, 5, 5).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "responsiveness", value: 0, .. }
        ));

        let err = Rating::new(5, 11, 5).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "quality_of_work", value: 11, .. }
        ));

        let err = Rating::new(5, 5, -3).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "timeliness", .. }
        ));
    }

    #[test]
    fn test_rating_bounds_inclusive() {
        assert!(Rating::new(1, 1, 1).is_ok());
        assert!(Rating::new(10, 10, 10).is_ok());
    }

    #[test]
    fn test_rating_deserializes_without_timestamp() {
        let json = r#"{"responsiveness": 8, "quality_of_work": 9, "timeliness": 7, "average": 8.0}"#;
        let rating: Rating = serde_json::from_str(json).unwrap();
        assert_eq!(rating.quality_of_work, 9);
        assert_eq!(rating.submitted_at, None);
    }

    #[test]
    fn test_rating_serializes_without_missing_timestamp() {
        let rating = Rating {
            responsiveness: 5,
            quality_of_work: 5,
            timeliness: 5,
            average: 5.0,
            submitted_at: None,
        };
        let json = serde_json::to_string(&rating).unwrap();
        assert!(!json.contains("submitted_at"));
    }

    #[test]
    fn test_check_rejects_stored_zero() {
        let rating = Rating {
            responsiveness: 0,
            quality_of_work: 5,
            timeliness: 5,
            average: 10.0 / 3.0,
            submitted_at: None,
        };
        assert!(rating.check().is_err());
    }

    #[test]
    fn test_key_encode() {
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();
        assert_eq!(key.encode(), "HPI_ALF_Alice Smith");
    }

    #[test]
    fn test_key_decode_keeps_underscores_in_technician() {
        let key = RatingKey::decode("HPI_ALF_Mary_Ann Jones").unwrap();
        assert_eq!(key.label(), "HPI");
        assert_eq!(key.site(), "ALF");
        assert_eq!(key.technician(), "Mary_Ann Jones");
        assert_eq!(key.encode(), "HPI_ALF_Mary_Ann Jones");
    }

    #[test]
    fn test_key_decode_rejects_missing_parts() {
        assert!(RatingKey::decode("HPI_ALF").is_none());
        assert!(RatingKey::decode("HPI").is_none());
        assert!(RatingKey::decode("HPI__Alice").is_none());
    }

    #[test]
    fn test_key_rejects_underscore_in_site() {
        let err = RatingKey::new("HPI", "AL_F", "Alice").unwrap_err();
        assert!(matches!(err, ValidationError::ReservedSeparator { field: "site", .. }));
    }

    #[test]
    fn test_key_trims_parts() {
        let key = RatingKey::new(" HPI ", "ALF", "  Alice Smith ").unwrap();
        assert_eq!(key.label(), "HPI");
        assert_eq!(key.technician(), "Alice Smith");
    }

    #[test]
    fn test_key_display() {
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();
        assert_eq!(key.to_string(), "Alice Smith at ALF [HPI]");
    }
}
