//! Live reading clock.
//!
//! Enters the reading view of the open run and redraws the elapsed time on
//! every refresh tick until interrupted. Each redraw recomputes elapsed from
//! the stored start instant, so a laptop lid closed for an hour shows the
//! right time on the first tick after it opens again.
//!
//! Ctrl-C counts as the app being hidden: the screen is snapshotted and the
//! refresh stopped, while the run itself stays open.

use super::open_tracker;
use crate::libs::formatter::format_clock;
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::screen;
use crate::libs::ticker::TokioTicker;
use crate::libs::timer::{TimerEvent, TimerObserver};
use crate::{msg_bail_anyhow, msg_info, msg_print};
use anyhow::Result;
use std::io::{self, Write};

/// Redraws a single clock line in place.
#[derive(Default)]
struct ClockLine;

impl TimerObserver for ClockLine {
    fn on_event(&mut self, event: &TimerEvent) {
        if let TimerEvent::Tick { elapsed } = event {
            print!("\r⏱  {}", format_clock(*elapsed));
            let _ = io::stdout().flush();
        }
    }
}

pub async fn cmd() -> Result<()> {
    let (ticker, mut ticks) = TokioTicker::new();
    let mut tracker = open_tracker(Box::new(ticker))?;

    let status = tracker.status()?;
    let Some(book_id) = status.book_id else {
        msg_bail_anyhow!(Message::NoActiveRun);
    };
    let title = tracker
        .library()
        .book(book_id)?
        .map(|b| b.title)
        .unwrap_or_else(|| Message::UnknownBook.to_string());

    msg_print!(Message::WatchHeader(title));
    if status.is_paused() {
        msg_info!(Message::RunStatusPausedHint(format_clock(status.elapsed)));
    }

    tracker.subscribe(Box::new(ClockLine));
    tracker.navigate(screen::View::Reading, Some(book_id))?;

    loop {
        tokio::select! {
            Some(()) = ticks.recv() => {
                tracker.tick();
            }
            _ = tokio::signal::ctrl_c() => {
                tracker.visibility_changed(false)?;
                println!();
                msg_info!(Message::WatchStopped);
                break;
            }
        }
    }

    Ok(())
}
