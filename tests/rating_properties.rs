//! Property-based tests for the rating store and ranking
//!
//! These tests verify invariants that should hold for all inputs:
//! - A rating's average is the mean of its three components
//! - Each successful append grows a bucket by exactly one
//! - Rejected scores never reach the store
//! - Rankings cover every technician, unrated ones at zero
//! - Persisted ratings reload unchanged, even with '_' in names

use proptest::prelude::*;
use tech_rater::ranking::rank;
use tech_rater::ratings::{JsonFileBackend, Rating, RatingKey, RatingStore};
use tempfile::TempDir;

fn valid_score() -> impl Strategy<Value = i64> {
    1i64..=10
}

fn invalid_score() -> impl Strategy<Value = i64> {
    prop_oneof![i64::MIN..1i64, 11i64..i64::MAX]
}

/// Names start and end with a letter so trimming leaves them unchanged
fn technician_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z_ ]{0,12}[a-z]"
}

fn site_code() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

proptest! {
    #[test]
    fn prop_average_is_component_mean(r in valid_score(), q in valid_score(), t in valid_score()) {
        let rating = Rating::new(r, q, t).unwrap();
        let expected = (r + q + t) as f64 / 3.0;
        prop_assert!((rating.average - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_append_grows_by_one(
        scores in prop::collection::vec((valid_score(), valid_score(), valid_score()), 1..12)
    ) {
        let mut store = RatingStore::in_memory();
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();

        for (i, (r, q, t)) in scores.iter().enumerate() {
            store.append(key.clone(), *r, *q, *t).unwrap();
            prop_assert_eq!(store.get(&key).len(), i + 1);
        }
    }

    #[test]
    fn prop_rejected_score_leaves_store_unchanged(
        bad in invalid_score(),
        position in 0usize..3,
    ) {
        let mut store = RatingStore::in_memory();
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();
        store.append(key.clone(), 5, 5, 5).unwrap();

        let mut scores = [5i64; 3];
        scores[position] = bad;
        prop_assert!(store.append(key.clone(), scores[0], scores[1], scores[2]).is_err());
        prop_assert_eq!(store.get(&key).len(), 1);
    }

    #[test]
    fn prop_rank_covers_every_technician(
        names in prop::collection::btree_set(technician_name(), 0..8),
        rated in prop::collection::vec(any::<bool>(), 8),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut store = RatingStore::in_memory();
        for (name, is_rated) in names.iter().zip(&rated) {
            if *is_rated {
                let key = RatingKey::new("HPI", "ALF", name).unwrap();
                store.append(key, 6, 7, 8).unwrap();
            }
        }

        let ranked = rank(&store, &names, "HPI", "ALF");
        prop_assert_eq!(ranked.len(), names.len());
        for tech in &ranked {
            if tech.num_ratings == 0 {
                prop_assert_eq!(tech.average_score, 0.0);
            }
        }
        // Best first
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].average_score >= pair[1].average_score);
        }
    }

    #[test]
    fn prop_persisted_ratings_reload_unchanged(
        entries in prop::collection::vec(
            (site_code(), technician_name(), valid_score(), valid_score(), valid_score()),
            1..10,
        )
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ratings.json");

        let mut store = RatingStore::open(Box::new(JsonFileBackend::new(&path))).unwrap();
        for (site, name, r, q, t) in &entries {
            let key = RatingKey::new("HPI", site, name).unwrap();
            store.append(key, *r, *q, *t).unwrap();
        }

        let reloaded = RatingStore::open(Box::new(JsonFileBackend::new(&path))).unwrap();
        let before: Vec<_> = store.keys().cloned().collect();
        let after: Vec<_> = reloaded.keys().cloned().collect();
        prop_assert_eq!(&before, &after);
        for key in &before {
            prop_assert_eq!(store.get(key), reloaded.get(key));
        }
    }
}
