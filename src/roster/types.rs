use crate::ratings::types::KEY_SEPARATOR;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

/// One row of the roster file: a technician assigned to a site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "SITE")]
    pub site: String,
    #[serde(rename = "FIRST_NAME", default)]
    pub first_name: String,
    #[serde(rename = "LAST_NAME", default)]
    pub last_name: String,
}

impl RosterEntry {
    pub fn new(site: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            site: site.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// "First Last", tolerating either part being blank
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Technicians per site, in file order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Build a roster, dropping blank rows, rows whose site code contains the
    /// key separator, and repeated (site, name) pairs
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for (i, mut entry) in entries.into_iter().enumerate() {
            entry.site = entry.site.trim().to_string();
            let name = entry.full_name();
            if entry.site.is_empty() || name.is_empty() {
                warn!(row = i + 1, "Skipping roster row with blank site or name");
                continue;
            }
            if entry.site.contains(KEY_SEPARATOR) {
                warn!(
                    row = i + 1,
                    site = %entry.site,
                    "Skipping roster row: site code contains '{}'",
                    KEY_SEPARATOR
                );
                continue;
            }
            if seen.insert((entry.site.clone(), name)) {
                kept.push(entry);
            }
        }

        Self { entries: kept }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct site codes in order of first appearance
    pub fn sites(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.site.as_str()))
            .map(|e| e.site.clone())
            .collect()
    }

    /// Full names of technicians at a site, in roster order
    pub fn technicians_at(&self, site: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.site == site)
            .map(RosterEntry::full_name)
            .collect()
    }

    pub fn has_technician(&self, site: &str, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.site == site && e.full_name() == name)
    }
}
