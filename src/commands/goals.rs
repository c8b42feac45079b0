use super::{local_offset, open_tracker};
use crate::libs::config::Config;
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::stats::goal_progress;
use crate::libs::ticker::TokioTicker;
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;
use chrono::Local;

/// Shows progress towards the configured reading goals.
pub fn cmd() -> Result<()> {
    let goals = Config::read()?.goals();
    let (ticker, _ticks) = TokioTicker::new();
    let tracker = open_tracker(Box::new(ticker))?;

    let data = tracker.library().data()?;
    let progress = goal_progress(&goals, Local::now().date_naive(), local_offset(), &data.sessions, &data.books);

    msg_print!(Message::GoalsHeader, true);
    View::goals(&progress)?;
    Ok(())
}
