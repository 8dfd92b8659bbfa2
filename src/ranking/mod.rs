pub mod engine;

pub use engine::{average, breakdown, rank, RankedTech, ScoreBreakdown};
