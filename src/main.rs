use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hos_ledger::config::AppConfig;
use hos_ledger::editor::{EditorSession, HeadOfStateStore, RawHeadOfStateForm, COLUMNS};
use hos_ledger::logging;
use hos_ledger::merger::{
    self, IndicatorFile, IndicatorSource, MergeOutcome, WorldBankClient,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_LOG_FILE: &str = "logs/hos-ledger.log";

#[derive(Parser)]
#[command(name = "hos-ledger", version, about = "Head of State rankings editor and leader/economy merger")]
struct Cli {
    /// Secrets file ([aws], [storage], [merger] tables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive rankings table with an add form (default)
    Editor {
        /// Where to write logs while the TUI owns the terminal
        #[arg(long, default_value = DEFAULT_LOG_FILE)]
        log_file: PathBuf,
    },
    /// Print the rankings, GDP Growth descending
    List,
    /// Add one head of state and save the table
    Add {
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// GDP at start, billions
        #[arg(long, default_value = "0")]
        gdp_start: String,
        /// GDP at end, billions
        #[arg(long, default_value = "0")]
        gdp_end: String,
    },
    /// Join a leader tenure file with yearly economic indicators
    Merge {
        /// Tab-separated tenure file
        #[arg(long)]
        tenures: PathBuf,
        /// Read indicators from a local CSV instead of the World Bank API
        #[arg(long)]
        indicators: Option<PathBuf>,
        #[arg(long)]
        from_year: Option<i32>,
        #[arg(long)]
        to_year: Option<i32>,
        /// Also write the merged table as CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Browse the result in the terminal UI
        #[arg(long)]
        view: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Editor {
        log_file: PathBuf::from(DEFAULT_LOG_FILE),
    });

    // Held until main returns so buffered log lines reach the file
    let _log_guard = match &command {
        Command::Editor { log_file } => Some(logging::init_file_logging(log_file)?),
        Command::Merge { view: true, .. } => {
            Some(logging::init_file_logging(Path::new(DEFAULT_LOG_FILE))?)
        }
        _ => {
            logging::init_logging();
            None
        }
    };

    let config = AppConfig::load(cli.config.as_deref())?;

    match command {
        Command::Editor { .. } => run_editor_mode(&config),
        Command::List => run_list(&config),
        Command::Add {
            name,
            start,
            end,
            gdp_start,
            gdp_end,
        } => run_add(
            &config,
            RawHeadOfStateForm {
                name,
                start_date: start,
                end_date: end,
                gdp_start,
                gdp_end,
            },
        ),
        Command::Merge {
            tenures,
            indicators,
            from_year,
            to_year,
            output,
            view,
        } => {
            let years = from_year.unwrap_or(config.merger.year_start)
                ..=to_year.unwrap_or(config.merger.year_end);

            let source: Box<dyn IndicatorSource> = match indicators {
                Some(path) => Box::new(IndicatorFile::new(path)),
                None => Box::new(
                    WorldBankClient::new(
                        config.merger.indicator_base_url.clone(),
                        config.merger.per_page,
                        config.merger.timeout(),
                    )
                    .context("Failed to build indicator client")?,
                ),
            };

            let outcome = merger::run_merge(&tenures, source.as_ref(), years)
                .context("Merge failed")?;
            present_merge(outcome, output, view)
        }
    }
}

fn open_session(config: &AppConfig) -> Result<EditorSession<Box<dyn hos_ledger::ObjectStore>>> {
    let bucket = config.open_bucket()?;
    let store = HeadOfStateStore::new(bucket, config.storage.object_key.clone());
    EditorSession::open(store).context("Failed to load head of state table")
}

#[cfg(feature = "tui")]
fn run_editor_mode(config: &AppConfig) -> Result<()> {
    let session = open_session(config)?;
    let mut app = hos_ledger::ui::EditorApp::new(session);
    hos_ledger::ui::run_editor(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_editor_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: hos-ledger list / hos-ledger add");
    std::process::exit(1);
}

fn run_list(config: &AppConfig) -> Result<()> {
    let session = open_session(config)?;

    println!("🏛️  Head of State Rankings");
    println!("Number of records: {}\n", session.table().len());
    let rows: Vec<Vec<String>> = session.ranked().iter().map(|r| r.cells().to_vec()).collect();
    print!("{}", merger::render_aligned(&COLUMNS, &rows, false));
    Ok(())
}

fn run_add(config: &AppConfig, raw: RawHeadOfStateForm) -> Result<()> {
    let form = raw.parse()?;
    let mut session = open_session(config)?;
    let record = session.submit(form).context("Failed to save head of state table")?;

    println!("Head of State added! Here are the details:\n");
    print!(
        "{}",
        merger::render_aligned(&COLUMNS, &[record.cells().to_vec()], false)
    );
    info!(rows = session.table().len(), "table saved");
    Ok(())
}

fn present_merge(outcome: MergeOutcome, output: Option<PathBuf>, view: bool) -> Result<()> {
    if let Some(path) = output {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        merger::write_csv(&outcome.rows, BufWriter::new(file))?;
        info!(path = %path.display(), rows = outcome.rows.len(), "wrote merged CSV");
    }

    if view {
        return view_merged(outcome);
    }

    print!("{}", merger::render_text_table(&outcome.rows));
    Ok(())
}

#[cfg(feature = "tui")]
fn view_merged(outcome: MergeOutcome) -> Result<()> {
    let mut viewer = hos_ledger::ui::MergedViewer::new(outcome.rows, outcome.report);
    hos_ledger::ui::run_merged_viewer(&mut viewer)
}

#[cfg(not(feature = "tui"))]
fn view_merged(outcome: MergeOutcome) -> Result<()> {
    eprintln!("❌ TUI mode not available, printing instead");
    print!("{}", merger::render_text_table(&outcome.rows));
    Ok(())
}
