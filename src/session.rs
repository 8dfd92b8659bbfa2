use crate::config::Config;
use crate::error::{RaterError, Result, ValidationError};
use crate::ranking::{self, RankedTech};
use crate::ratings::{JsonFileBackend, Rating, RatingKey, RatingStore};
use crate::roster::{load_roster, Roster};
use tracing::{debug, warn};

/// Everything one user session works with: config, roster and store.
///
/// Built once at startup and passed by reference to the CLI commands and
/// the TUI. Loading problems leave the session usable in a degraded mode and
/// are reported through `open`'s second return value.
pub struct Session {
    config: Config,
    roster: Option<Roster>,
    roster_error: Option<String>,
    store: RatingStore,
}

impl Session {
    /// Load roster and store from the paths in `config`
    pub fn open(config: Config) -> (Self, Vec<RaterError>) {
        let mut problems = Vec::new();

        let roster = load_roster(&config.roster_path()).map_err(|e| {
            let reason = match &e {
                RaterError::DataUnavailable { reason, .. } => reason.clone(),
                other => other.to_string(),
            };
            problems.push(e);
            reason
        });

        let backend = JsonFileBackend::new(config.store_path());
        let (store, store_error) = RatingStore::open_or_degraded(Box::new(backend));
        problems.extend(store_error);

        debug!(
            roster = roster.is_ok(),
            read_only = store.is_read_only(),
            "Session opened"
        );
        (Self::from_parts(config, roster, store), problems)
    }

    /// Assemble a session from already-loaded parts. An `Err` roster carries
    /// the reason it is unavailable.
    pub fn from_parts(
        mut config: Config,
        roster: std::result::Result<Roster, String>,
        store: RatingStore,
    ) -> Self {
        config.labels = config.labels.iter().map(|l| l.trim().to_string()).collect();
        config.sites = config.sites.iter().map(|s| s.trim().to_string()).collect();

        if let Ok(roster) = &roster {
            let known = roster.sites();
            for site in config.sites.iter().filter(|s| !known.contains(s)) {
                warn!(site = %site, "Configured site has no technicians on the roster");
            }
        }

        let (roster, roster_error) = match roster {
            Ok(roster) => (Some(roster), None),
            Err(reason) => (None, Some(reason)),
        };

        Self {
            config,
            roster,
            roster_error,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn roster(&self) -> Result<&Roster> {
        self.roster.as_ref().ok_or_else(|| {
            RaterError::data_unavailable(
                "roster",
                self.roster_error.as_deref().unwrap_or("not loaded"),
            )
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.config.labels
    }

    /// Selectable sites: the configured list, else every site on the roster
    pub fn sites(&self) -> Vec<String> {
        if !self.config.sites.is_empty() {
            return self.config.sites.clone();
        }
        self.roster.as_ref().map(Roster::sites).unwrap_or_default()
    }

    pub fn check_label(&self, label: &str) -> Result<()> {
        let label = label.trim();
        if self.config.labels.iter().any(|l| l == label) {
            Ok(())
        } else {
            Err(ValidationError::UnknownLabel(label.to_string()).into())
        }
    }

    /// Accepts any site when there is nothing to check against
    pub fn check_site(&self, site: &str) -> Result<()> {
        let site = site.trim();
        let sites = self.sites();
        if sites.is_empty() || sites.iter().any(|s| s == site) {
            Ok(())
        } else {
            Err(ValidationError::UnknownSite(site.to_string()).into())
        }
    }

    /// Technicians at a site in roster order
    pub fn technicians(&self, site: &str) -> Result<Vec<String>> {
        self.check_site(site)?;
        Ok(self.roster()?.technicians_at(site.trim()))
    }

    /// Record one rating for a technician on the roster
    pub fn submit(
        &mut self,
        label: &str,
        site: &str,
        technician: &str,
        responsiveness: i64,
        quality: i64,
        timeliness: i64,
    ) -> Result<Rating> {
        self.check_label(label)?;
        self.check_site(site)?;
        let key = RatingKey::new(label, site, technician)?;
        if !self.roster()?.has_technician(key.site(), key.technician()) {
            return Err(ValidationError::UnknownTechnician {
                site: key.site().to_string(),
                technician: key.technician().to_string(),
            }
            .into());
        }
        self.store.append(key, responsiveness, quality, timeliness)
    }

    /// Ranking for every technician at a site, including unrated ones
    pub fn ranking(&self, label: &str, site: &str) -> Result<Vec<RankedTech>> {
        self.check_label(label)?;
        let technicians = self.technicians(site)?;
        Ok(ranking::rank(&self.store, &technicians, label.trim(), site.trim()))
    }

    /// A technician's ratings in submission order. Works without a roster.
    pub fn history(&self, label: &str, site: &str, technician: &str) -> Result<&[Rating]> {
        self.check_label(label)?;
        self.check_site(site)?;
        let key = RatingKey::new(label, site, technician)?;
        Ok(self.store.get(&key))
    }

    /// Re-read the store from disk
    pub fn reload(&mut self) -> Result<()> {
        self.store.reload()
    }
}
