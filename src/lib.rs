//! # Bookking - reading tracker
//!
//! A command-line reading log: a library of books, a reading clock that
//! survives the process being killed, and statistics over the recorded
//! sessions.
//!
//! ## Features
//!
//! - **Reading clock**: start, pause, resume and finish a run; elapsed time is
//!   always derived from the stored start instant
//! - **Crash recovery**: an open run and the last reading screen are restored
//!   on the next launch
//! - **Sessions**: each finished run becomes a session that advances the
//!   book's next page and status
//! - **Statistics**: day, week, month, year and all-time summaries plus goal
//!   progress
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bookking::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
