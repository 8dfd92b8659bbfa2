use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tech_rater::config::{self, Config};
use tech_rater::ratings::{parse_score, RatingKey};
use tech_rater::tui::app::FlashKind;
use tech_rater::tui::{self, App};
use tech_rater::{output, ranking, RaterError, Session};
use tracing::warn;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DATA_UNAVAILABLE: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_PERSISTENCE: i32 = 4;
const EXIT_CONFIG: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum RankFormat {
    Table,
    Tsv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum HistoryFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive rating and ranking (default if no subcommand)
    Tui,
    /// List selectable site codes
    Sites,
    /// List technicians at a site in roster order
    Techs {
        site: String,
    },
    /// Record one rating for a technician
    Rate {
        site: String,
        /// Technician full name as it appears on the roster
        tech: String,
        /// Responsiveness score (1-10)
        #[arg(short = 'r', long, allow_hyphen_values = true)]
        responsiveness: String,
        /// Quality of work score (1-10)
        #[arg(short = 'q', long = "quality", allow_hyphen_values = true)]
        quality_of_work: String,
        /// Timeliness score (1-10)
        #[arg(short = 't', long, allow_hyphen_values = true)]
        timeliness: String,
        /// Rating label (defaults to the first configured label)
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Show a technician's ratings, oldest first
    History {
        site: String,
        tech: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(long, value_enum, default_value_t = HistoryFormat::Table)]
        format: HistoryFormat,
    },
    /// Rank the technicians at a site by average score
    Rank {
        site: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(long, value_enum, default_value_t = RankFormat::Table)]
        format: RankFormat,
    },
    /// Interactive setup wizard for the config file
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "tech-rater")]
#[command(about = "Rate field technicians per site and rank them", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/tech-rater/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Roster CSV, overrides the config file
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Rating store JSON, overrides the config file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);
    let interactive = matches!(command, Commands::Tui);

    if !interactive {
        tech_rater::logging::init_stderr(cli.verbose);
    }

    if let Commands::Init = command {
        if let Err(e) = config::init::run_init_wizard(cli.config) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let mut config = match config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    apply_overrides(&mut config, cli.roster, cli.store);

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let result = if interactive {
        run_interactive(config, cli.verbose).await
    } else {
        let (mut session, problems) = Session::open(config);
        for problem in &problems {
            eprintln!("Warning: {}", problem);
        }
        run_command(&mut session, command)
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
    std::process::exit(EXIT_SUCCESS);
}

fn apply_overrides(config: &mut Config, roster: Option<PathBuf>, store: Option<PathBuf>) {
    if roster.is_some() {
        config.roster = roster;
    }
    if store.is_some() {
        config.store = store;
    }
}

/// Map the domain error inside `e` (if any) to a process exit code
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<RaterError>() {
        Some(RaterError::DataUnavailable { .. }) => EXIT_DATA_UNAVAILABLE,
        Some(RaterError::Validation(_)) => EXIT_VALIDATION,
        Some(RaterError::Persistence { .. }) => EXIT_PERSISTENCE,
        None => EXIT_FAILURE,
    }
}

async fn run_interactive(config: Config, verbose: bool) -> anyhow::Result<()> {
    // The TUI owns the terminal, so logs go to a file
    let _guard = tech_rater::logging::init_file(&config.log_path(), verbose)?;

    let theme = tui::resolve_theme(config.theme);
    let (session, problems) = Session::open(config);
    for problem in &problems {
        warn!(error = %problem, "Starting in degraded mode");
    }

    let mut app = App::new(session, theme);
    if let Some(problem) = problems.first() {
        app.show_flash(problem.to_string(), FlashKind::Error);
    }
    tui::run_tui(app).await
}

fn run_command(session: &mut Session, command: Commands) -> anyhow::Result<()> {
    let use_colors = output::should_use_colors();

    match command {
        Commands::Sites => {
            let sites = session.sites();
            if sites.is_empty() {
                // Nothing configured; surface why the roster gave nothing
                session.roster()?;
            }
            for site in sites {
                println!("{}", site);
            }
        }
        Commands::Techs { site } => {
            for name in session.technicians(&site)? {
                println!("{}", name);
            }
        }
        Commands::Rate {
            site,
            tech,
            responsiveness,
            quality_of_work,
            timeliness,
            label,
        } => {
            let r = parse_score("responsiveness", &responsiveness).map_err(RaterError::from)?;
            let q = parse_score("quality_of_work", &quality_of_work).map_err(RaterError::from)?;
            let t = parse_score("timeliness", &timeliness).map_err(RaterError::from)?;
            let label = resolve_label(session, label);

            let rating = session.submit(&label, &site, &tech, r.into(), q.into(), t.into())?;
            let key = RatingKey::new(&label, &site, &tech).map_err(RaterError::from)?;
            println!("{}", output::format_submission(&key, &rating));
        }
        Commands::History {
            site,
            tech,
            label,
            format,
        } => {
            let label = resolve_label(session, label);
            let ratings = session.history(&label, &site, &tech)?;
            let totals = ranking::breakdown(ratings);

            match format {
                HistoryFormat::Table => {
                    let key = RatingKey::new(&label, &site, &tech).map_err(RaterError::from)?;
                    println!("{}", key);
                    println!("{}", output::format_history(ratings, use_colors));
                    if !ratings.is_empty() {
                        println!();
                        println!("{}", output::format_breakdown(&totals));
                    }
                }
                HistoryFormat::Json => {
                    let doc = serde_json::json!({
                        "label": label,
                        "site": site.trim(),
                        "technician": tech.trim(),
                        "ratings": ratings,
                        "breakdown": totals,
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&doc).context("Failed to encode history")?
                    );
                }
            }
        }
        Commands::Rank {
            site,
            label,
            format,
        } => {
            let label = resolve_label(session, label);
            let ranked = session.ranking(&label, &site)?;

            match format {
                RankFormat::Table => {
                    println!("{}", output::format_ranking_table(&ranked, use_colors))
                }
                RankFormat::Tsv => println!("{}", output::format_ranking_tsv(&ranked)),
                RankFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&ranked).context("Failed to encode ranking")?
                ),
            }
        }
        Commands::Tui | Commands::Init => {}
    }

    Ok(())
}

fn resolve_label(session: &Session, label: Option<String>) -> String {
    label
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| session.config().default_label().to_string())
}
