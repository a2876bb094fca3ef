mod input;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_core::{
    build_schedule_with, parse_shift_md, recheck_assignments, to_csv, PlannerOptions,
};
use settings::Settings;

#[derive(Parser)]
#[command(name = "roster", about = "Monthly nurse roster generator and validator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a roster from a nurses CSV and a rules JSON
    Generate {
        #[arg(long)]
        nurses: PathBuf,
        #[arg(long)]
        rules: PathBuf,
        /// Optional JSON list of pinned {nurse_id, date, shift} cells
        #[arg(long)]
        fixed: Option<PathBuf>,
        /// Optional JSON roster to diagnose if no feasible plan exists
        #[arg(long)]
        current: Option<PathBuf>,
        /// How many alternative rosters to enumerate
        #[arg(long, default_value_t = 1)]
        alternatives: usize,
    },
    /// Generate from a human-authored shift document
    GenerateMd {
        #[arg(long)]
        md: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, default_value_t = 1)]
        alternatives: usize,
    },
    /// Re-check an edited roster against the rules
    Recheck {
        #[arg(long)]
        nurses: PathBuf,
        #[arg(long)]
        rules: PathBuf,
        /// JSON list of assignments to validate
        #[arg(long)]
        assignments: PathBuf,
    },
    /// Print an assignment list as CSV
    ExportCsv {
        #[arg(long)]
        assignments: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("load settings")?;
    let options = PlannerOptions {
        time_limit: Duration::from_secs(settings.solver.time_limit_secs),
    };

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            nurses,
            rules,
            fixed,
            current,
            alternatives,
        } => {
            let nurses = input::load_nurses_csv(&nurses)?;
            let rules = input::load_rules_json(&rules)?;
            let fixed = fixed.map(|path| input::load_fixed_json(&path)).transpose()?;
            let current = current
                .map(|path| input::load_assignments_json(&path))
                .transpose()?;
            let alternatives = alternatives.clamp(1, settings.solver.max_alternatives.max(1));
            let outcome = build_schedule_with(
                &nurses,
                &rules,
                fixed.as_deref(),
                current.as_deref(),
                alternatives,
                options,
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_ok() {
                std::process::exit(2);
            }
        }
        Command::GenerateMd {
            md,
            year,
            month,
            alternatives,
        } => {
            let text = std::fs::read_to_string(&md)
                .with_context(|| format!("read shift document {}", md.display()))?;
            let (nurses, rules) = parse_shift_md(&text, year, month);
            tracing::info!(nurses = nurses.len(), "parsed shift document");
            let alternatives = alternatives.clamp(1, settings.solver.max_alternatives.max(1));
            let outcome = build_schedule_with(&nurses, &rules, None, None, alternatives, options);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_ok() {
                std::process::exit(2);
            }
        }
        Command::Recheck {
            nurses,
            rules,
            assignments,
        } => {
            let nurses = input::load_nurses_csv(&nurses)?;
            let rules = input::load_rules_json(&rules)?;
            let assignments = input::load_assignments_json(&assignments)?;
            let report = recheck_assignments(&assignments, &nurses, &rules);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.ok {
                std::process::exit(1);
            }
        }
        Command::ExportCsv { assignments } => {
            let assignments = input::load_assignments_json(&assignments)?;
            print!("{}", to_csv(&assignments)?);
        }
    }
    Ok(())
}
