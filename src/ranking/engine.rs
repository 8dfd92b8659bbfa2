use serde::Serialize;

use crate::ratings::{Rating, RatingKey, RatingStore};

/// A technician's position in a ranking. Derived on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTech {
    pub name: String,
    pub average_score: f64, // 0 when unrated
    pub num_ratings: usize,
}

/// Per-component means over a technician's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub responsiveness: f64,
    pub quality_of_work: f64,
    pub timeliness: f64,
    pub average: f64,
    pub num_ratings: usize,
}

/// Mean of each rating's stored average; 0 for no ratings.
pub fn average(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| r.average).sum::<f64>() / ratings.len() as f64
}

/// Rank technicians at a site under a label, best average first.
///
/// The sort is stable, so technicians with equal averages (including every
/// unrated technician) keep the order they were passed in.
pub fn rank<S: AsRef<str>>(
    store: &RatingStore,
    technicians: &[S],
    label: &str,
    site: &str,
) -> Vec<RankedTech> {
    let mut ranked: Vec<RankedTech> = technicians
        .iter()
        .map(|name| {
            let name = name.as_ref();
            // A name that can't form a key can't have ratings either
            let ratings = RatingKey::new(label, site, name)
                .map(|key| store.get(&key))
                .unwrap_or(&[]);
            RankedTech {
                name: name.to_string(),
                average_score: average(ratings),
                num_ratings: ratings.len(),
            }
        })
        .collect();

    // Averages are finite, so total_cmp agrees with numeric order
    ranked.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    ranked
}

pub fn breakdown(ratings: &[Rating]) -> ScoreBreakdown {
    let mean = |pick: fn(&Rating) -> u8| -> f64 {
        if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| pick(r) as f64).sum::<f64>() / ratings.len() as f64
        }
    };

    ScoreBreakdown {
        responsiveness: mean(|r| r.responsiveness),
        quality_of_work: mean(|r| r.quality_of_work),
        timeliness: mean(|r| r.timeliness),
        average: average(ratings),
        num_ratings: ratings.len(),
    }
}
