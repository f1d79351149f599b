//! cyclecal - Cycle phase calendar
//!
//! CLI entry point: one-shot query subcommands and the interactive menu.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::AsyncRead;

use cyclecal::cli::display::{render_menu, render_session_header};
use cyclecal::cli::report;
use cyclecal::cli::{Answer, OutputFormat, Prompt};
use cyclecal::input;
use cyclecal::log::QueryLogger;
use cyclecal::{CalendarConfig, Horizon, Session};

const PHASE_PROMPT: &str = "Enter phase (Menstruatie, Piek, Ovulatie, Luteaal): ";

/// Cycle phase calendar
///
/// Generates every combination of phase durations from the anchor date and
/// answers which phase is likely on a day, in a month, or across a year.
#[derive(Parser, Debug)]
#[command(name = "cyclecal", version, about)]
struct Cli {
    /// Path to a cyclecal.toml configuration file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon in years (overrides horizon_years from the config)
    #[arg(long, conflicts_with = "days")]
    years: Option<i32>,

    /// Horizon in days, using the rotating duration lists instead of combinations
    #[arg(long)]
    days: Option<i64>,

    /// Print answers as JSON
    #[arg(long)]
    json: bool,

    /// Directory for the JSONL query log (no log when omitted)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Phase probabilities for a date, e.g. "24 03 2024"
    Probability {
        /// Date as "dd mm yyyy"
        date: String,
    },
    /// Best day of a month for a phase
    Month {
        /// Month as "mm yyyy"
        month_year: String,
        /// Phase name
        phase: String,
    },
    /// Best day per month of a year for a phase
    BestDays {
        /// Year as "yyyy"
        year: String,
        /// Phase name
        phase: String,
    },
    /// List intervals starting within N years of the anchor
    List {
        /// Number of years to show
        years: i32,
    },
    /// Interactive menu (default)
    Interactive,
}

/// Where answers go: stdout, plus the query log when enabled.
struct Sink {
    format: OutputFormat,
    logger: Option<QueryLogger>,
}

impl Sink {
    fn emit(&self, answer: &Answer) -> Result<()> {
        println!("{}", answer.body);
        if let Some(logger) = &self.logger {
            logger
                .append(&answer.record)
                .context("Failed to write to query log")?;
        }
        Ok(())
    }
}

/// Outcome of one interactive menu option
enum Step {
    Answer(Answer),
    Rejected(anyhow::Error),
    Eof,
}

impl From<Result<Answer>> for Step {
    fn from(result: Result<Answer>) -> Self {
        result.map_or_else(Self::Rejected, Self::Answer)
    }
}

/// Load the config file, or the built-in defaults when no path is given.
fn load_config(path: Option<&Path>) -> Result<CalendarConfig> {
    path.map_or_else(
        || Ok(CalendarConfig::default()),
        |p| {
            CalendarConfig::from_path(p)
                .with_context(|| format!("Failed to load config from '{}'", p.display()))
        },
    )
}

/// Horizon from the command line, if one was given.
const fn explicit_horizon(years: Option<i32>, days: Option<i64>) -> Option<Horizon> {
    match (years, days) {
        (_, Some(days)) => Some(Horizon::Days(days)),
        (Some(years), None) => Some(Horizon::Years(years)),
        (None, None) => None,
    }
}

/// Answer one subcommand.
fn run_command(session: &Session, command: &Command, format: OutputFormat) -> Result<Answer> {
    match command {
        Command::Probability { date } => {
            let date = input::parse_date(date)?;
            report::probability(session, date, format)
        }
        Command::Month { month_year, phase } => {
            let (month, year) = input::parse_month_year(month_year)?;
            let phase = input::parse_phase(phase)?;
            report::phase_days(session, month, year, phase, format)
        }
        Command::BestDays { year, phase } => {
            let year = input::parse_year(year)?;
            let phase = input::parse_phase(phase)?;
            report::best_days(session, year, phase, format)
        }
        Command::List { years } => report::listing(session, *years, format),
        Command::Interactive => anyhow::bail!("Interactive mode is not a one-shot query"),
    }
}

/// Ask for the initial horizon in years, falling back to the configured one.
async fn ask_initial_horizon<R: AsyncRead + Unpin>(
    prompt: &mut Prompt<R>,
    config: &CalendarConfig,
) -> Result<Horizon> {
    let default = config.horizon_years;
    let question = format!("Enter the number of years to calculate [{default}]: ");
    let Some(line) = prompt.ask(&question).await? else {
        return Ok(Horizon::Years(default));
    };
    match input::parse_years(&line, default) {
        Ok(years) => Ok(Horizon::Years(years)),
        Err(err) => {
            eprintln!("{} {err:#}; using {default}", "✗".red().bold());
            Ok(Horizon::Years(default))
        }
    }
}

async fn ask_probability<R: AsyncRead + Unpin>(
    session: &Session,
    prompt: &mut Prompt<R>,
    format: OutputFormat,
) -> Result<Step> {
    let Some(line) = prompt.ask("Enter date (dd mm yyyy): ").await? else {
        return Ok(Step::Eof);
    };
    Ok(input::parse_date(&line)
        .and_then(|date| report::probability(session, date, format))
        .into())
}

async fn ask_phase_days<R: AsyncRead + Unpin>(
    session: &Session,
    prompt: &mut Prompt<R>,
    format: OutputFormat,
) -> Result<Step> {
    let Some(line) = prompt.ask("Enter month and year (mm yyyy): ").await? else {
        return Ok(Step::Eof);
    };
    let (month, year) = match input::parse_month_year(&line) {
        Ok(parsed) => parsed,
        Err(err) => return Ok(Step::Rejected(err)),
    };
    let Some(phase) = prompt.ask(PHASE_PROMPT).await? else {
        return Ok(Step::Eof);
    };
    Ok(input::parse_phase(&phase)
        .and_then(|phase| report::phase_days(session, month, year, phase, format))
        .into())
}

async fn ask_best_days<R: AsyncRead + Unpin>(
    session: &Session,
    prompt: &mut Prompt<R>,
    format: OutputFormat,
) -> Result<Step> {
    let Some(line) = prompt.ask("Enter year (yyyy): ").await? else {
        return Ok(Step::Eof);
    };
    let year = match input::parse_year(&line) {
        Ok(year) => year,
        Err(err) => return Ok(Step::Rejected(err)),
    };
    let Some(phase) = prompt.ask(PHASE_PROMPT).await? else {
        return Ok(Step::Eof);
    };
    Ok(input::parse_phase(&phase)
        .and_then(|phase| report::best_days(session, year, phase, format))
        .into())
}

async fn ask_listing<R: AsyncRead + Unpin>(
    session: &Session,
    prompt: &mut Prompt<R>,
    format: OutputFormat,
) -> Result<Step> {
    let default = session.config().horizon_years;
    let question = format!("Enter the number of years to show [{default}]: ");
    let Some(line) = prompt.ask(&question).await? else {
        return Ok(Step::Eof);
    };
    Ok(input::parse_count(&line, default)
        .and_then(|years| report::listing(session, years, format))
        .into())
}

/// Ask for a new horizon and recompute the cycle set. Returns `false` at end
/// of input.
async fn ask_horizon<R: AsyncRead + Unpin>(session: &mut Session, prompt: &mut Prompt<R>) -> Result<bool> {
    let question = format!(
        "Enter horizon as years or days, e.g. 2 or 400d [{}]: ",
        session.horizon()
    );
    let Some(line) = prompt.ask(&question).await? else {
        return Ok(false);
    };
    match input::parse_horizon(&line, session.horizon()) {
        Ok(horizon) => {
            if session.set_horizon(horizon) {
                eprintln!("{}", render_session_header(session));
            }
        }
        Err(err) => eprintln!("{} {err:#}", "✗".red().bold()),
    }
    Ok(true)
}

/// Menu loop. Invalid input is reported and the menu shown again; `q` or
/// end of input exits.
async fn run_interactive<R: AsyncRead + Unpin>(
    session: &mut Session,
    prompt: &mut Prompt<R>,
    sink: &Sink,
) -> Result<()> {
    eprintln!("{}", render_session_header(session));

    loop {
        eprint!("{}", render_menu());
        let Some(choice) = prompt.ask("> ").await? else {
            return Ok(());
        };

        let step = match choice.as_str() {
            "1" => ask_probability(session, prompt, sink.format).await?,
            "2" => ask_phase_days(session, prompt, sink.format).await?,
            "3" => ask_best_days(session, prompt, sink.format).await?,
            "4" => ask_listing(session, prompt, sink.format).await?,
            "5" => {
                if !ask_horizon(session, prompt).await? {
                    return Ok(());
                }
                continue;
            }
            "q" | "quit" | "exit" => return Ok(()),
            _ => {
                eprintln!("{}", "Invalid option.".red());
                continue;
            }
        };

        match step {
            Step::Answer(answer) => sink.emit(&answer)?,
            Step::Rejected(err) => eprintln!("{} {err:#}", "✗".red().bold()),
            Step::Eof => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let logger = cli
        .log_dir
        .as_ref()
        .map(QueryLogger::new)
        .transpose()
        .context("Failed to initialize query log")?;
    let sink = Sink { format, logger };
    let horizon = explicit_horizon(cli.years, cli.days)
        .map(Horizon::check)
        .transpose()?;

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let mut prompt = Prompt::new(tokio::io::stdin());
            let horizon = match horizon {
                Some(horizon) => horizon,
                None => ask_initial_horizon(&mut prompt, &config).await?,
            };
            let mut session = Session::new(config, horizon);
            run_interactive(&mut session, &mut prompt, &sink).await
        }
        command => {
            let session = match horizon {
                Some(horizon) => Session::new(config, horizon),
                None => Session::with_default_horizon(config),
            };
            let answer = run_command(&session, &command, format)?;
            sink.emit(&answer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclecal::QueryKind;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(CalendarConfig::default(), Horizon::Years(1))
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["cyclecal", "probability", "24 03 2024"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Probability {
                date: "24 03 2024".to_string()
            })
        );

        let cli = Cli::try_parse_from(["cyclecal", "--years", "2", "best-days", "2024", "Piek"]).unwrap();
        assert_eq!(cli.years, Some(2));
        assert!(matches!(cli.command, Some(Command::BestDays { .. })));
    }

    #[test]
    fn test_cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["cyclecal"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_rejects_years_with_days() {
        assert!(Cli::try_parse_from(["cyclecal", "--years", "1", "--days", "30"]).is_err());
    }

    #[test]
    fn test_explicit_horizon() {
        assert_eq!(explicit_horizon(None, None), None);
        assert_eq!(explicit_horizon(Some(3), None), Some(Horizon::Years(3)));
        assert_eq!(explicit_horizon(None, Some(90)), Some(Horizon::Days(90)));
    }

    #[test]
    fn test_load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), CalendarConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/cyclecal.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_run_command_probability() {
        let command = Command::Probability {
            date: "24 03 2024".to_string(),
        };
        let answer = run_command(&session(), &command, OutputFormat::Text).unwrap();
        assert!(answer.body.contains("Menstruatie"));
        assert_eq!(answer.record.query, QueryKind::Probability);
    }

    #[test]
    fn test_run_command_rejects_bad_input() {
        let command = Command::Month {
            month_year: "13 2024".to_string(),
            phase: "Piek".to_string(),
        };
        assert!(run_command(&session(), &command, OutputFormat::Text).is_err());

        let command = Command::BestDays {
            year: "2024".to_string(),
            phase: "Winter".to_string(),
        };
        assert!(run_command(&session(), &command, OutputFormat::Text).is_err());
    }

    #[tokio::test]
    async fn test_ask_initial_horizon() {
        let config = CalendarConfig::default();

        let mut prompt = Prompt::new(&b"3\n"[..]);
        assert_eq!(ask_initial_horizon(&mut prompt, &config).await.unwrap(), Horizon::Years(3));

        let mut prompt = Prompt::new(&b"\n"[..]);
        assert_eq!(ask_initial_horizon(&mut prompt, &config).await.unwrap(), Horizon::Years(1));

        let mut prompt = Prompt::new(&b"many\n"[..]);
        assert_eq!(ask_initial_horizon(&mut prompt, &config).await.unwrap(), Horizon::Years(1));

        let mut prompt = Prompt::new(&b"200000\n"[..]);
        assert_eq!(ask_initial_horizon(&mut prompt, &config).await.unwrap(), Horizon::Years(1));
    }

    #[tokio::test]
    async fn test_interactive_session_logs_each_answer() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Sink {
            format: OutputFormat::Text,
            logger: Some(QueryLogger::new(temp_dir.path()).unwrap()),
        };
        let script = "1\n24 03 2024\n\
                      2\n04 2024\nOvulatie\n\
                      3\n2024\nPiek\n\
                      4\n1\n\
                      9\n\
                      1\nyesterday\n\
                      5\n2\n\
                      q\n";
        let mut prompt = Prompt::new(script.as_bytes());
        let mut session = session();

        run_interactive(&mut session, &mut prompt, &sink).await.unwrap();

        let records = sink.logger.as_ref().unwrap().read_all().unwrap();
        let kinds: Vec<QueryKind> = records.iter().map(|r| r.query).collect();
        assert_eq!(
            kinds,
            vec![
                QueryKind::Probability,
                QueryKind::PhaseDays,
                QueryKind::BestDays,
                QueryKind::Listing
            ]
        );
        assert_eq!(session.horizon(), Horizon::Years(2));
    }

    #[tokio::test]
    async fn test_interactive_stops_at_end_of_input() {
        let sink = Sink {
            format: OutputFormat::Json,
            logger: None,
        };
        let mut prompt = Prompt::new(&b"2\n04 2024\n"[..]);
        let mut session = session();
        run_interactive(&mut session, &mut prompt, &sink).await.unwrap();
    }
}
