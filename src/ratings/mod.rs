pub mod storage;
pub mod store;
pub mod types;
pub mod validation;

pub use storage::{get_store_path, JsonFileBackend, MemoryBackend, RatingBackend, StoreDocument};
pub use store::RatingStore;
pub use types::{Rating, RatingKey};
pub use validation::{parse_score, validate_score, MAX_SCORE, MIN_SCORE};
