//! `book` subcommands: add, list, show, archive and unarchive.

use super::{local_offset, open_tracker};
use crate::libs::book::NewBook;
use crate::libs::library::Library;
use crate::libs::messages::Message;
use crate::libs::ticker::TokioTicker;
use crate::libs::view::View;
use crate::{msg_error_anyhow, msg_info, msg_print, msg_success};
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct BookArgs {
    #[command(subcommand)]
    command: BookCommands,
}

#[derive(Debug, Subcommand)]
enum BookCommands {
    #[command(about = "Add a book")]
    Add {
        #[arg(long, short)]
        title: String,
        #[arg(long, short, default_value = "")]
        author: String,
        #[arg(long, default_value_t = 1)]
        first_page: u32,
        #[arg(long)]
        last_page: u32,
    },
    #[command(about = "List books")]
    List {
        /// Show archived books instead of the active shelf
        #[arg(long)]
        archived: bool,
    },
    #[command(about = "Show a book with its sessions")]
    Show { id: i64 },
    #[command(about = "Move a finished book to the archive")]
    Archive { id: i64 },
    #[command(about = "Take a book out of the archive")]
    Unarchive { id: i64 },
}

pub fn cmd(args: BookArgs) -> Result<()> {
    let (ticker, _ticks) = TokioTicker::new();
    let tracker = open_tracker(Box::new(ticker))?;
    let library = tracker.library();

    match args.command {
        BookCommands::Add {
            title,
            author,
            first_page,
            last_page,
        } => {
            let book = library.add_book(&NewBook::new(&title, &author, first_page, last_page), Utc::now())?;
            msg_success!(Message::BookAdded(book.title, book.id));
        }
        BookCommands::List { archived } => {
            let books: Vec<_> = library.books()?.into_iter().filter(|b| b.is_archived() == archived).collect();
            if books.is_empty() {
                msg_info!(Message::NoBooks);
                return Ok(());
            }
            View::books(&books)?;
        }
        BookCommands::Show { id } => {
            let book = library.book(id)?.ok_or_else(|| msg_error_anyhow!(Message::BookNotFound(id)))?;
            View::book(&book, local_offset())?;
            let sessions = library.sessions(Some(id))?;
            if sessions.is_empty() {
                msg_info!(Message::NoSessions);
            } else {
                msg_print!(Message::SessionsHeader, true);
                View::sessions(&sessions, local_offset())?;
            }
        }
        BookCommands::Archive { id } => {
            let book = library.book(id)?.ok_or_else(|| msg_error_anyhow!(Message::BookNotFound(id)))?;
            library.update_book(id, &book.archive(Utc::now())?)?;
            msg_success!(Message::BookArchived(book.title));
        }
        BookCommands::Unarchive { id } => {
            let book = library.book(id)?.ok_or_else(|| msg_error_anyhow!(Message::BookNotFound(id)))?;
            let update = book.unarchive(Utc::now())?;
            library.update_book(id, &update)?;
            let status = update.status.unwrap_or(book.status);
            msg_success!(Message::BookUnarchived(book.title, status.to_string()));
        }
    }
    Ok(())
}
