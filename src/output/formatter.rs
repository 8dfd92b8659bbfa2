use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::ranking::{RankedTech, ScoreBreakdown};
use crate::ratings::{Rating, RatingKey};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format an average with two decimals, or "-" for an unrated technician
pub fn format_score(score: f64, rated: bool) -> String {
    if rated {
        format!("{:.2}", score)
    } else {
        "-".to_string()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a ranking as a table with columns: Index, Score, Count, Name
/// No headers. Unrated technicians show "-" for the score.
pub fn format_ranking_table(ranked: &[RankedTech], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No technicians at this site.".to_string();
    }

    let term_width = get_terminal_width();

    // Index "99." + space, score 5 + separator, count "(999)" + separator
    let fixed_width = 4 + 5 + 2 + 5 + 2;

    ranked
        .iter()
        .enumerate()
        .map(|(idx, tech)| {
            let rated = tech.num_ratings > 0;
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>5}", format_score(tech.average_score, rated));
            let count_str = format!("{:>5}", format!("({})", tech.num_ratings));

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&tech.name, width - fixed_width)
                }
                Some(_) => truncate_name(&tech.name, 20),
                None => tech.name.clone(),
            };

            if use_colors {
                let score_colored = if rated {
                    score_str.bold().to_string()
                } else {
                    score_str.dimmed().to_string()
                };
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    score_colored,
                    count_str.dimmed(),
                    name
                )
            } else {
                format!("{} {}  {}  {}", index_str, score_str, count_str, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a ranking as tab-separated values for scripting
/// Columns: rank, average, count, name (no headers, no colors)
pub fn format_ranking_tsv(ranked: &[RankedTech]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, tech)| {
            format!(
                "{}\t{:.2}\t{}\t{}",
                idx + 1,
                tech.average_score,
                tech.num_ratings,
                tech.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// "2026-10-18 14:03 (3d ago)", or "-" for ratings saved without a timestamp
pub fn format_submitted(submitted_at: Option<DateTime<Utc>>) -> String {
    match submitted_at {
        None => "-".to_string(),
        Some(at) => {
            let age = format_age(Utc::now() - at);
            let ago = if age == "now" {
                age
            } else {
                format!("{} ago", age)
            };
            format!("{} ({})", at.format("%Y-%m-%d %H:%M"), ago)
        }
    }
}

/// One-line summary of a single rating's components
pub fn format_rating(rating: &Rating) -> String {
    format!(
        "R {:>2}  Q {:>2}  T {:>2}  avg {:.2}",
        rating.responsiveness, rating.quality_of_work, rating.timeliness, rating.average
    )
}

/// Format a technician's history, oldest first, one numbered line per rating
pub fn format_history(ratings: &[Rating], use_colors: bool) -> String {
    if ratings.is_empty() {
        return "No ratings yet.".to_string();
    }

    ratings
        .iter()
        .enumerate()
        .map(|(idx, rating)| {
            let index_str = format!("{:>2}.", idx + 1);
            let when = format_submitted(rating.submitted_at);
            if use_colors {
                format!(
                    "{} {}  {}",
                    index_str.dimmed(),
                    format_rating(rating),
                    when.dimmed()
                )
            } else {
                format!("{} {}  {}", index_str, format_rating(rating), when)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_breakdown(breakdown: &ScoreBreakdown) -> String {
    let plural = if breakdown.num_ratings == 1 { "" } else { "s" };
    format!(
        "Responsiveness {:.2} | Quality {:.2} | Timeliness {:.2} | Overall {} ({} rating{})",
        breakdown.responsiveness,
        breakdown.quality_of_work,
        breakdown.timeliness,
        format_score(breakdown.average, breakdown.num_ratings > 0),
        breakdown.num_ratings,
        plural
    )
}

/// Confirmation printed after a successful submission
pub fn format_submission(key: &RatingKey, rating: &Rating) -> String {
    format!("Rated {}: {}", key, format_rating(rating))
}
