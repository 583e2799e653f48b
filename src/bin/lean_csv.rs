//! Lean CSV Tool - Command-line reports over the daily MLB dashboard
//!
//! Loads a dated dashboard CSV, applies the team filter and report view,
//! and prints or exports the resulting table.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mlb_lean_dashboard::config::{parse_threshold, DashboardConfig};
use mlb_lean_dashboard::lean::{classify_with, LeanThresholds};
use mlb_lean_dashboard::report::{self, build_report, CallSummary, ReportView};
use mlb_lean_dashboard::source::{self, MatchupTable};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lean-csv")]
#[command(about = "Show, filter and export the daily MLB lean dashboard")]
struct Cli {
    /// Directory containing mlb_dashboard_YYYY-MM-DD.csv files
    /// (default: from ~/.lean-dashboard.conf, else ./data)
    #[arg(long, global = true, env = "LEAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(flatten)]
    thresholds: ThresholdArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the lean tier thresholds.
#[derive(Args)]
struct ThresholdArgs {
    /// Minimum ERA edge for a strong call
    #[arg(long, global = true, value_parser = parse_threshold)]
    strong_era: Option<f64>,

    /// Minimum WHIP edge for a strong call
    #[arg(long, global = true, value_parser = parse_threshold)]
    strong_whip: Option<f64>,

    /// Minimum ERA edge for a moderate call
    #[arg(long, global = true, value_parser = parse_threshold)]
    moderate_era: Option<f64>,

    /// Minimum WHIP edge for a moderate call
    #[arg(long, global = true, value_parser = parse_threshold)]
    moderate_whip: Option<f64>,
}

impl ThresholdArgs {
    fn apply(&self, mut t: LeanThresholds) -> LeanThresholds {
        if let Some(v) = self.strong_era {
            t.strong_era = v;
        }
        if let Some(v) = self.strong_whip {
            t.strong_whip = v;
        }
        if let Some(v) = self.moderate_era {
            t.moderate_era = v;
        }
        if let Some(v) = self.moderate_whip {
            t.moderate_whip = v;
        }
        t
    }
}

/// Which dashboard file to read.
#[derive(Args)]
struct SourceArgs {
    /// Dashboard date (YYYY-MM-DD), default today
    #[arg(short, long, conflicts_with = "input")]
    date: Option<String>,

    /// Read this CSV instead of the dated file in the data directory
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard table
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Report view: full-game or f5
        #[arg(short, long, default_value = "full-game")]
        view: ReportView,

        /// Only show rows for this team
        #[arg(short, long)]
        team: Option<String>,

        /// Print the call key after the table (F5 view)
        #[arg(long)]
        key: bool,
    },

    /// Export the displayed table (.csv or .xlsx by extension)
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Report view: full-game or f5
        #[arg(short, long, default_value = "full-game")]
        view: ReportView,

        /// Only export rows for this team
        #[arg(short, long)]
        team: Option<String>,

        /// Output file (default: <dashboard name>_<view>.csv in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List F5 lean calls per matchup with a summary
    Calls {
        #[command(flatten)]
        source: SourceArgs,

        /// Only list rows for this team
        #[arg(short, long)]
        team: Option<String>,

        /// Write the call listing as CSV instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the teams in a dashboard
    Teams {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List dates with a dashboard file in the data directory
    Dates,

    /// Classify a single matchup
    Classify {
        /// Subject pitcher ERA (last 3 starts)
        era: String,
        /// Subject pitcher WHIP (last 3 starts)
        whip: String,
        /// Opponent pitcher ERA (last 3 starts)
        opp_era: String,
        /// Opponent pitcher WHIP (last 3 starts)
        opp_whip: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = DashboardConfig::load();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.thresholds = cli.thresholds.apply(config.thresholds);
    log::debug!("Using config {:?}", config);

    match cli.command {
        Commands::Show {
            source,
            view,
            team,
            key,
        } => {
            let (table, _) = load_table(&config, &source)?;
            let table = table.filter_team(team_filter(team.as_deref()));
            let report = build_report(&table, view, &config.thresholds);
            print!("{}", report.render_text()?);
            if view.has_lean_calls() {
                println!();
                print!("{}", report.summary());
                if key {
                    println!("\nF5 Call Key:");
                    print!("{}", report::call_key(&config.thresholds));
                }
            }
        }
        Commands::Export {
            source,
            view,
            team,
            output,
        } => {
            let (table, file_name) = load_table(&config, &source)?;
            let table = table.filter_team(team_filter(team.as_deref()));
            let report = build_report(&table, view, &config.thresholds);
            let output = output.unwrap_or_else(|| default_export_path(&file_name, view));
            report.export(&output)?;
            eprintln!("Wrote {} rows to {}", report.len(), output.display());
        }
        Commands::Calls {
            source,
            team,
            output,
        } => {
            let (table, _) = load_table(&config, &source)?;
            let table = table.filter_team(team_filter(team.as_deref()));
            let records = report::call_records(&table, &config.thresholds);
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    report::write_call_records(&records, file)?;
                    eprintln!("Wrote {} calls to {}", records.len(), path.display());
                }
                None => {
                    for r in &records {
                        println!(
                            "{:<5} vs {:<5} {:<16} {}",
                            r.team, r.opponent, r.call, r.reason
                        );
                    }
                    println!();
                    print!("{}", CallSummary::from_records(&records));
                }
            }
        }
        Commands::Teams { source } => {
            let (table, _) = load_table(&config, &source)?;
            for team in table.teams() {
                println!("{}", team);
            }
        }
        Commands::Dates => {
            let dates = source::available_dates(&config.data_dir)?;
            if dates.is_empty() {
                eprintln!("No dashboard files in {}", config.data_dir.display());
            }
            for date in dates {
                println!("{}", date);
            }
        }
        Commands::Classify {
            era,
            whip,
            opp_era,
            opp_whip,
        } => {
            let c = classify_with(&config.thresholds, &era, &whip, &opp_era, &opp_whip);
            if c.is_unparseable() {
                log::warn!("One or more stats are not numbers");
            }
            if c.reason().is_empty() {
                println!("{}", c.label());
            } else {
                println!("{}  ({})", c.label(), c.reason());
            }
        }
    }

    Ok(())
}

/// Load the selected dashboard, returning the table and its file name.
fn load_table(config: &DashboardConfig, args: &SourceArgs) -> Result<(MatchupTable, String)> {
    if let Some(path) = &args.input {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dashboard.csv")
            .to_string();
        return Ok((MatchupTable::from_path(path)?, name));
    }

    let date = match &args.date {
        Some(d) => source::parse_date(d)?,
        None => source::today(),
    };
    let table = source::load_for_date(&config.data_dir, date)?;
    Ok((table, source::dashboard_file_name(date)))
}

/// Export name next to the source name, e.g. `mlb_dashboard_2025-06-01_f5.csv`.
fn default_export_path(file_name: &str, view: ReportView) -> PathBuf {
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    let suffix = match view {
        ReportView::FullGame => "full_game",
        ReportView::F5 => "f5",
    };
    PathBuf::from(format!("{}_{}.csv", stem, suffix))
}

/// "All" (any case) or no team means no filter.
fn team_filter(team: Option<&str>) -> Option<&str> {
    team.filter(|t| !t.eq_ignore_ascii_case("all"))
}
