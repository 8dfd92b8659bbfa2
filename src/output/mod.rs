pub mod formatter;

pub use formatter::{
    format_age, format_breakdown, format_history, format_ranking_table, format_ranking_tsv,
    format_rating, format_score, format_submission, format_submitted, should_use_colors,
    truncate_name,
};
