use super::types::{Roster, RosterEntry};
use crate::error::{RaterError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const ROSTER_WHAT: &str = "roster";
const REQUIRED_COLUMNS: [&str; 3] = ["SITE", "FIRST_NAME", "LAST_NAME"];

/// Get the default roster path (~/.config/tech-rater/roster.csv)
pub fn get_roster_path() -> PathBuf {
    crate::config::get_config_dir().join("roster.csv")
}

/// Load the roster CSV from disk
///
/// A missing, unreadable or malformed file is `DataUnavailable`.
pub fn load_roster(path: &Path) -> Result<Roster> {
    let file = File::open(path).map_err(|e| {
        RaterError::data_unavailable(
            ROSTER_WHAT,
            format!("cannot open {}: {}", path.display(), e),
        )
    })?;

    let roster = parse_roster(file).map_err(|reason| {
        RaterError::data_unavailable(ROSTER_WHAT, format!("{}: {}", path.display(), reason))
    })?;

    debug!(
        path = %path.display(),
        technicians = roster.len(),
        sites = roster.sites().len(),
        "Loaded roster"
    );
    Ok(roster)
}

/// Parse roster CSV with a header row; extra columns are ignored
pub fn parse_roster<R: Read>(reader: R) -> std::result::Result<Roster, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| format!("cannot read header row: {}", e))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing column(s) {}", missing.join(", ")));
    }

    let mut entries = Vec::new();
    for result in rdr.deserialize() {
        let entry: RosterEntry = result.map_err(|e| format!("bad row: {}", e))?;
        entries.push(entry);
    }

    Ok(Roster::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_basic() {
        let csv = "SITE,FIRST_NAME,LAST_NAME\nALF,Alice,Smith\nALF,Bob,Lee\n";
        let roster = parse_roster(csv.as_bytes()).unwrap();
        assert_eq!(roster.technicians_at("ALF"), vec!["Alice Smith", "Bob Lee"]);
    }

    #[test]
    fn test_parse_extra_columns_and_order() {
        let csv = "EMPLOYEE_ID,LAST_NAME,SITE,FIRST_NAME,PHONE\n17,Smith,ALF,Alice,555-0100\n";
        let roster = parse_roster(csv.as_bytes()).unwrap();
        assert_eq!(roster.technicians_at("ALF"), vec!["Alice Smith"]);
    }

    #[test]
    fn test_parse_trims_cells() {
        let csv = "SITE,FIRST_NAME,LAST_NAME\n ALF , Alice ,Smith \n";
        let roster = parse_roster(csv.as_bytes()).unwrap();
        assert!(roster.has_technician("ALF", "Alice Smith"));
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "SITE,NAME\nALF,Alice Smith\n";
        let err = parse_roster(csv.as_bytes()).unwrap_err();
        assert!(err.contains("FIRST_NAME"));
        assert!(err.contains("LAST_NAME"));
    }

    #[test]
    fn test_parse_skips_unusable_site_codes() {
        let csv = "SITE,FIRST_NAME,LAST_NAME\nAL_F,Alice,Smith\nALF,Bob,Lee\n";
        let roster = parse_roster(csv.as_bytes()).unwrap();
        assert_eq!(roster.sites(), vec!["ALF"]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_parse_header_only() {
        let csv = "SITE,FIRST_NAME,LAST_NAME\n";
        let roster = parse_roster(csv.as_bytes()).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_roster(&dir.path().join("nope.csv")).unwrap_err();
        match err {
            RaterError::DataUnavailable { what, .. } => assert_eq!(what, "roster"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(&path, "SITE,FIRST_NAME,LAST_NAME\nBOS,Dan,Wu\n").unwrap();

        let roster = load_roster(&path).unwrap();
        assert_eq!(roster.sites(), vec!["BOS"]);
    }
}
