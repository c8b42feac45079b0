//! `session` subcommands: manual entry and listing.

use super::{local_offset, open_tracker};
use crate::libs::formatter::{format_reading_time, format_speed};
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::ticker::TokioTicker;
use crate::libs::view::View;
use crate::{msg_error_anyhow, msg_info, msg_success};
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    command: SessionCommands,
}

#[derive(Debug, Subcommand)]
enum SessionCommands {
    #[command(about = "Record a session read without the clock")]
    Add {
        #[arg(long, short)]
        book: i64,
        /// Start time, 'YYYY-MM-DD HH:MM' in local time
        #[arg(long)]
        start: String,
        /// End time, 'YYYY-MM-DD HH:MM' in local time
        #[arg(long)]
        end: String,
        #[arg(long)]
        first_page: u32,
        #[arg(long)]
        last_page: u32,
    },
    #[command(about = "List recorded sessions")]
    List {
        /// Only sessions of this book
        #[arg(long, short)]
        book: Option<i64>,
    },
}

pub fn cmd(args: SessionArgs) -> Result<()> {
    let (ticker, _ticks) = TokioTicker::new();
    let tracker = open_tracker(Box::new(ticker))?;

    match args.command {
        SessionCommands::Add {
            book,
            start,
            end,
            first_page,
            last_page,
        } => {
            let session = tracker.record_manual_session(book, parse_local_time(&start)?, parse_local_time(&end)?, first_page, last_page)?;
            msg_success!(Message::SessionRecorded(
                session.pages_read,
                format_reading_time(session.duration_secs()),
                format_speed(session.reading_speed),
            ));
        }
        SessionCommands::List { book } => {
            let sessions = tracker.library().sessions(book)?;
            if sessions.is_empty() {
                msg_info!(Message::NoSessions);
                return Ok(());
            }
            View::sessions(&sessions, local_offset())?;
        }
    }
    Ok(())
}

fn parse_local_time(value: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| msg_error_anyhow!(Message::InvalidLocalTime(value.to_string())))?;
    Ok(local.with_timezone(&Utc))
}
