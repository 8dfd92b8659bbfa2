pub mod loader;
pub mod types;

pub use loader::{get_roster_path, load_roster, parse_roster};
pub use types::{Roster, RosterEntry};
