use super::open_tracker;
use crate::libs::config::Config;
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::ticker::TokioTicker;
use crate::{msg_info, msg_success, msg_warning};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Deletes every book, session and goal after confirmation.
///
/// An open reading run is discarded with the rest.
pub fn cmd() -> Result<()> {
    let (ticker, _ticks) = TokioTicker::new();
    let mut tracker = open_tracker(Box::new(ticker))?;

    if let Some(book_id) = tracker.current_book_id()? {
        let title = match tracker.library().book(book_id)? {
            Some(book) => book.title,
            None => Message::UnknownBook.to_string(),
        };
        msg_warning!(Message::OpenRunWillBeDiscarded(title));
    }

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmClearAllData.to_string())
        .default(false)
        .interact()?;

    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    tracker.clear_all_data()?;

    let mut config = Config::read().unwrap_or_default();
    config.goals = None;
    config.save()?;

    msg_success!(Message::AllDataCleared);
    Ok(())
}
