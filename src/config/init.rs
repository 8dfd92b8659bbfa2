use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, validate_config, Config, ThemeMode};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Split "A, B ,C" into ["A", "B", "C"], dropping blanks
pub fn parse_code_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_theme(input: &str) -> Option<ThemeMode> {
    match input.trim().to_lowercase().as_str() {
        "auto" => Some(ThemeMode::Auto),
        "dark" => Some(ThemeMode::Dark),
        "light" => Some(ThemeMode::Light),
        _ => None,
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, the config is written there.
/// Otherwise the default config path is used.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Technician Rater Configuration");
    println!("==============================");
    println!();

    let defaults = Config::default();

    println!("The roster is a CSV file with SITE, FIRST_NAME and LAST_NAME columns.");
    let roster = prompt_with_default(
        "Roster file",
        &defaults.roster_path().display().to_string(),
    )?;

    println!();
    println!("Ratings are kept in a single JSON file, rewritten on every submission.");
    let store = prompt_with_default(
        "Rating store file",
        &defaults.store_path().display().to_string(),
    )?;

    println!();
    println!("Labels group ratings into separate schemes. Codes may not contain '_'.");
    let labels = loop {
        let input = prompt_with_default("Labels (comma separated)", &defaults.labels.join(", "))?;
        let labels = parse_code_list(&input);
        let candidate = Config {
            labels: labels.clone(),
            ..Config::default()
        };
        match validate_config(&candidate) {
            Ok(()) => break labels,
            Err(errors) => println!("  Invalid: {}. Try again.", errors.join("; ")),
        }
    };

    println!();
    println!("Restrict the selectable sites, or leave blank to offer every site in the roster.");
    let sites = loop {
        let input = prompt("Site codes (comma separated, blank for all): ")?;
        let sites = parse_code_list(&input);
        let candidate = Config {
            sites: sites.clone(),
            ..Config::default()
        };
        match validate_config(&candidate) {
            Ok(()) => break sites,
            Err(errors) => println!("  Invalid: {}. Try again.", errors.join("; ")),
        }
    };

    println!();
    let theme = loop {
        let input = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        match parse_theme(&input) {
            Some(theme) => break theme,
            None => println!("  Invalid: expected auto, dark or light. Try again."),
        }
    };

    let config = Config {
        roster: Some(PathBuf::from(roster)),
        store: Some(PathBuf::from(store)),
        labels,
        sites,
        theme,
        log_file: None,
    };

    let config_path = default_path.unwrap_or_else(get_config_path);
    if config_path.exists() {
        println!();
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted. Existing config left unchanged.");
            return Ok(());
        }
    }

    let yaml = serde_saphyr::to_string(&config).context("Failed to serialize config")?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    Ok(())
}
