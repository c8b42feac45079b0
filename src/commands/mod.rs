//! Command-line interface.
//!
//! Every invocation is a fresh process, so each command starts by building
//! the [`ReadingTracker`] and recovering whatever run the previous process
//! left behind. Only `watch` keeps the process alive long enough for the
//! display refresh to matter.

pub mod book;
pub mod goals;
pub mod init;
pub mod reset;
pub mod session;
pub mod stats;
pub mod timer;
pub mod watch;

use crate::db::{db::Db, kv::SqliteStore, library::SqliteLibrary};
use crate::libs::clock::SystemClock;
use crate::libs::config::Config;
use crate::libs::ticker::Ticker;
use crate::libs::tracker::ReadingTracker;
use crate::msg_debug;
use anyhow::Result;
use chrono::{FixedOffset, Local, NaiveDate, Offset};
use clap::{Parser, Subcommand};

/// The tracker as wired for the CLI.
pub type CliTracker = ReadingTracker<SqliteStore, SystemClock, SqliteLibrary>;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init,
    #[command(about = "Manage books", arg_required_else_help = true)]
    Book(book::BookArgs),
    #[command(about = "Start reading a book")]
    Start(timer::StartArgs),
    #[command(about = "Pause the reading clock")]
    Pause,
    #[command(about = "Resume the reading clock")]
    Resume,
    #[command(about = "Show the open reading run")]
    Status,
    #[command(about = "Finish reading and record the session")]
    Done(timer::DoneArgs),
    #[command(about = "Discard the open reading run")]
    Cancel,
    #[command(about = "Show a live reading clock")]
    Watch,
    #[command(about = "Manage reading sessions", arg_required_else_help = true)]
    Session(session::SessionArgs),
    #[command(about = "Reading statistics")]
    Stats(stats::StatsArgs),
    #[command(about = "Progress towards reading goals")]
    Goals,
    #[command(about = "Delete all books, sessions and goals")]
    Reset,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init => init::cmd(),
            Commands::Book(args) => book::cmd(args),
            Commands::Start(args) => timer::start(args),
            Commands::Pause => timer::pause(),
            Commands::Resume => timer::resume(),
            Commands::Status => timer::status(),
            Commands::Done(args) => timer::done(args),
            Commands::Cancel => timer::cancel(),
            Commands::Watch => watch::cmd().await,
            Commands::Session(args) => session::cmd(args),
            Commands::Stats(args) => stats::cmd(args),
            Commands::Goals => goals::cmd(),
            Commands::Reset => reset::cmd(),
        }
    }
}

/// Opens the database, builds the tracker and recovers the previous run.
pub(crate) fn open_tracker(ticker: Box<dyn Ticker>) -> Result<CliTracker> {
    let config = Config::read()?;
    let db = Db::new()?;
    let mut tracker =
        ReadingTracker::new(SqliteStore::new(&db), SystemClock, ticker, SqliteLibrary::new(&db)).with_refresh_period(config.timer().refresh_period());

    let status = tracker.launch()?;
    msg_debug!(format!("recovered run: {:?}", status));
    Ok(tracker)
}

/// The local UTC offset used for calendar-day bucketing.
pub(crate) fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Parses `today` or `YYYY-MM-DD`.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if date_str.to_lowercase() == "today" {
        Ok(Local::now().date_naive())
    } else {
        Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
    }
}
