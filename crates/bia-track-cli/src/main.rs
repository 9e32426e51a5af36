use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use bia_track_core::report::{history_csv, HistoryRow};
use bia_track_core::{
    Caption, Condition, Dashboard, DashboardView, LabelCatalog, Profile, Tracker, TrackerConfig,
    TrendSeries,
};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bia-track",
    version,
    about = "Log weight and bio-impedance readings and flag fluid retention."
)]
struct Cli {
    /// SQLite database file (overrides config and BIA_TRACK_DB).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Condition tag the command applies to.
    #[arg(long, short, global = true, default_value = "cardiac")]
    condition: String,

    /// Display language: en, tr or de.
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a reading.
    Record {
        /// Weight in kg (a decimal comma is accepted).
        #[arg(long, short)]
        weight: String,
        /// Bio-impedance in ohms.
        #[arg(long, short)]
        impedance: String,
    },
    /// Full history, newest first.
    History {
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
    /// Readings in the current trend window, oldest first.
    Trend,
    /// Latest status, trend and history for the condition.
    Status,
    /// Compose a report.
    Report {
        /// Directory the report file is written into.
        #[arg(long, short, default_value = ".")]
        out: PathBuf,
        /// Write a PDF instead of HTML.
        #[arg(long)]
        pdf: bool,
        /// Print to stdout in this format instead of writing a file.
        #[arg(long, value_enum)]
        print: Option<ReportFormat>,
    },
    /// Show or change the patient profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Condition tags with recorded readings.
    Conditions,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListFormat {
    Text,
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportFormat {
    Text,
    Json,
    Csv,
    Svg,
    Pdf,
}

/// Plain terminal rendering of a dashboard.
struct TerminalView;

impl DashboardView for TerminalView {
    fn render(&mut self, dashboard: &Dashboard) {
        println!("{} ({})", dashboard.condition_label, dashboard.condition);
        println!(
            "{} / {}",
            dashboard.profile.display_name(),
            dashboard.profile.display_contact()
        );

        match &dashboard.latest {
            Some(latest) => println!("{}", latest.status_label),
            None => println!("---"),
        }

        match &dashboard.trend {
            TrendSeries::Data(series) => {
                let (lo, hi) = series.weight_range();
                let (zlo, zhi) = series.impedance_range();
                println!(
                    "trend: {} readings, weight {:.1}-{:.1} kg, impedance {}-{} Ω",
                    series.len(),
                    lo,
                    hi,
                    zlo,
                    zhi
                );
            }
            TrendSeries::NoData => {
                if let Some(notice) = &dashboard.notice {
                    println!("{}", notice);
                }
            }
        }

        for row in &dashboard.history {
            println!("  {}", row.text_line());
        }
    }
}

fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    let tracker = open_tracker(&cli)?;
    let condition = Condition::from_tag(&cli.condition);

    match cli.command {
        Command::Record { weight, impedance } => {
            let measurement = tracker
                .submit_reading(&weight, &impedance, &cli.condition)
                .context("Reading was not recorded")?;
            println!(
                "#{} {}",
                measurement.seq,
                tracker.catalog().status_label(&measurement.status)
            );
        }
        Command::History { format } => {
            let rows: Vec<HistoryRow> = tracker
                .history(&condition)?
                .iter()
                .map(|m| HistoryRow::from_measurement(m, tracker.catalog()))
                .collect();
            match format {
                ListFormat::Text => {
                    for row in &rows {
                        println!("{}", row.text_line());
                    }
                }
                ListFormat::Csv => print!("{}", history_csv(condition.tag(), &rows)),
                ListFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            }
        }
        Command::Trend => match tracker.trend(&condition)? {
            TrendSeries::Data(series) => {
                let points = series
                    .timestamps
                    .iter()
                    .zip(&series.weights)
                    .zip(&series.impedances);
                for ((ts, weight), impedance) in points {
                    println!("{}  {:>6.1} kg  {:>4} Ω", ts.format("%d/%m %H:%M"), weight, impedance);
                }
            }
            TrendSeries::NoData => println!("{}", tracker.catalog().caption(Caption::NoData)),
        },
        Command::Status => tracker.refresh(&condition, &mut TerminalView)?,
        Command::Report { out, pdf, print } => {
            let artifact = tracker
                .compose_report(&condition)
                .with_context(|| format!("Could not compose report for {}", condition))?;
            match print {
                Some(ReportFormat::Text) => print!("{}", artifact.to_text()),
                Some(ReportFormat::Json) => println!("{}", artifact.to_json()?),
                Some(ReportFormat::Csv) => print!("{}", artifact.history_csv()),
                Some(ReportFormat::Svg) => println!("{}", artifact.chart_svg()),
                Some(ReportFormat::Pdf) => {
                    let bytes = artifact.to_pdf().context("Could not render PDF")?;
                    std::io::stdout().write_all(&bytes)?;
                }
                None => {
                    std::fs::create_dir_all(&out)
                        .with_context(|| format!("Could not create {:?}", out))?;
                    let written = if pdf {
                        artifact.write_pdf_to_dir(&out)
                    } else {
                        artifact.write_to_dir(&out)
                    };
                    let path =
                        written.with_context(|| format!("Could not write report into {:?}", out))?;
                    println!("{}", path.display());
                    println!("sha256 {}", artifact.content_digest);
                }
            }
        }
        Command::Profile { action } => match action {
            ProfileAction::Show => {
                let profile = tracker.profile()?;
                println!("{}", profile.display_name());
                println!("{}", profile.display_contact());
            }
            ProfileAction::Set { name, contact } => {
                tracker.update_profile(&Profile::new(name, contact))?;
            }
        },
        Command::Conditions => {
            for condition in tracker.conditions()? {
                println!(
                    "{}\t{}",
                    condition.tag(),
                    tracker.catalog().condition_label(&condition)
                );
            }
        }
    }

    Ok(())
}

/// Config file, then environment, then command-line flags.
fn open_tracker(cli: &Cli) -> anyhow::Result<Tracker> {
    let mut config = TrackerConfig::load(cli.config.as_deref())
        .with_context(|| format!("Could not load configuration from {:?}", cli.config))?;

    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    if let Some(locale) = &cli.locale {
        config.locale = locale
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid --locale")?;
    }

    let path = config.database_path.clone();
    Tracker::open(config).with_context(|| format!("Could not open measurement store {:?}", path))
}
