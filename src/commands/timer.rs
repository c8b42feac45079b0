//! Reading clock commands: `start`, `pause`, `resume`, `status`, `done`
//! and `cancel`.

use super::{open_tracker, CliTracker};
use crate::libs::book::BookStatus;
use crate::libs::error::TrackerError;
use crate::libs::formatter::{format_clock, format_reading_time, format_speed};
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::ticker::TokioTicker;
use crate::libs::tracker::BeginOutcome;
use crate::{msg_bail_anyhow, msg_info, msg_print, msg_success, msg_warning};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Book to read
    #[arg(long, short)]
    book: i64,
}

#[derive(Debug, Args)]
pub struct DoneArgs {
    /// Last page read in this session
    #[arg(long, short)]
    end_page: u32,
}

/// Builds a tracker whose refresh ticks nobody listens to; one-shot
/// commands exit long before the first redraw would matter.
fn tracker() -> Result<CliTracker> {
    let (ticker, _ticks) = TokioTicker::new();
    open_tracker(Box::new(ticker))
}

fn book_title(tracker: &CliTracker, book_id: Option<i64>) -> Result<String> {
    let title = match book_id {
        Some(id) => tracker.library().book(id)?.map(|b| b.title),
        None => None,
    };
    Ok(title.unwrap_or_else(|| Message::UnknownBook.to_string()))
}

pub fn start(args: StartArgs) -> Result<()> {
    let mut tracker = tracker()?;
    let outcome = match tracker.begin_reading(args.book) {
        Ok(outcome) => outcome,
        Err(TrackerError::IllegalTransition { from: BookStatus::Archived, .. }) => {
            let title = book_title(&tracker, Some(args.book))?;
            msg_warning!(Message::BookIsArchived(title));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let title = book_title(&tracker, Some(args.book))?;
    match outcome {
        BeginOutcome::Started => msg_success!(Message::ReadingStarted(title)),
        BeginOutcome::Attached { elapsed } => msg_info!(Message::ReadingAlreadyActive(title, format_clock(elapsed))),
    }
    Ok(())
}

pub fn pause() -> Result<()> {
    let mut tracker = tracker()?;
    let elapsed = tracker.pause()?;
    msg_success!(Message::ReadingPaused(format_clock(elapsed)));
    Ok(())
}

pub fn resume() -> Result<()> {
    let mut tracker = tracker()?;
    let elapsed = tracker.resume()?;
    msg_success!(Message::ReadingResumed(format_clock(elapsed)));
    Ok(())
}

pub fn status() -> Result<()> {
    let tracker = tracker()?;
    let status = tracker.status()?;
    if !status.is_active() {
        msg_info!(Message::NoActiveRun);
        return Ok(());
    }

    let title = book_title(&tracker, status.book_id)?;
    if status.is_paused() {
        msg_print!(Message::RunStatusPaused(title, format_clock(status.elapsed)));
    } else {
        msg_print!(Message::RunStatusRunning(title, format_clock(status.elapsed)));
    }
    Ok(())
}

pub fn done(args: DoneArgs) -> Result<()> {
    let mut tracker = tracker()?;
    if !tracker.status()?.is_active() {
        msg_bail_anyhow!(Message::NoActiveRun);
    }

    let completion = tracker.complete_reading(args.end_page)?;
    msg_success!(Message::SessionRecorded(
        completion.session.pages_read,
        format_reading_time(completion.session.duration_secs()),
        format_speed(completion.session.reading_speed),
    ));
    if completion.book.status == BookStatus::Finished && completion.book.date_finished == Some(completion.session.end_time) {
        msg_success!(Message::BookFinished(completion.book.title.clone()), true);
    }
    Ok(())
}

pub fn cancel() -> Result<()> {
    let mut tracker = tracker()?;
    if !tracker.status()?.is_active() {
        msg_info!(Message::NoActiveRun);
        return Ok(());
    }
    tracker.abandon_reading()?;
    msg_success!(Message::ReadingCancelled);
    Ok(())
}
