//! User-facing text for every [`Message`].
//!
//! All console wording lives here so commands only pick a variant and pass
//! the already formatted values (titles, clock strings, speeds).

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === READING CLOCK MESSAGES ===
            Message::ReadingStarted(title) => format!("Started reading '{}'", title),
            Message::ReadingAlreadyActive(title, elapsed) => format!("Already reading '{}' ({})", title, elapsed),
            Message::ReadingPaused(elapsed) => format!("Reading paused at {}", elapsed),
            Message::ReadingResumed(elapsed) => format!("Reading resumed at {}", elapsed),
            Message::ReadingCancelled => "Reading run discarded".to_string(),
            Message::NoActiveRun => "No reading in progress".to_string(),
            Message::RunStatusPaused(title, elapsed) => format!("⏸  '{}' paused at {}", title, elapsed),
            Message::RunStatusRunning(title, elapsed) => format!("📖 Reading '{}' for {}", title, elapsed),
            Message::RunStatusPausedHint(elapsed) => format!("Paused at {}. Run `bookking resume` to continue.", elapsed),
            Message::SessionRecorded(pages, duration, speed) => format!("Session recorded: {} page(s) in {} ({})", pages, duration, speed),
            Message::BookFinished(title) => format!("🎉 Finished '{}'", title),
            Message::UnknownBook => "Unknown book".to_string(),
            Message::WatchHeader(title) => format!("📖 {} (Ctrl-C to stop watching)", title),
            Message::WatchStopped => "Stopped watching. The reading clock keeps running.".to_string(),

            // === BOOK MESSAGES ===
            Message::BookAdded(title, id) => format!("Book '{}' added with ID {}", title, id),
            Message::NoBooks => "No books yet. Add one with `bookking book add`.".to_string(),
            Message::BookNotFound(id) => format!("Book with ID {} not found", id),
            Message::BookArchived(title) => format!("Book '{}' archived", title),
            Message::BookUnarchived(title, status) => format!("Book '{}' restored as {}", title, status),
            Message::BookIsArchived(title) => format!("'{}' is archived. Run `bookking book unarchive` first.", title),

            // === SESSION MESSAGES ===
            Message::NoSessions => "No reading sessions found".to_string(),
            Message::SessionsHeader => "Reading sessions:".to_string(),
            Message::InvalidLocalTime(value) => format!("Invalid local time '{}', expected YYYY-MM-DD HH:MM", value),

            // === STATS MESSAGES ===
            Message::StatsHeader(period, anchor) => format!("📊 Reading stats ({}, {})", period, anchor),
            Message::GoalsHeader => "🎯 Reading goals".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleGoals => "Goals settings".to_string(),
            Message::ConfigModuleTimer => "Timer settings".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptDailyPages => "Pages per day".to_string(),
            Message::PromptWeeklyPages => "Pages per week".to_string(),
            Message::PromptMonthlyBooks => "Books per month".to_string(),
            Message::PromptYearlyBooks => "Books per year".to_string(),
            Message::PromptRefreshInterval => "Clock refresh interval (ms)".to_string(),

            // === RESET MESSAGES ===
            Message::ConfirmClearAllData => {
                "Delete all books, reading sessions and goals? This cannot be undone".to_string()
            }
            Message::OpenRunWillBeDiscarded(title) => format!("The open reading run of '{}' will be discarded", title),
            Message::AllDataCleared => "All data cleared".to_string(),
            Message::OperationCancelled => "Operation cancelled".to_string(),

            // === MIGRATION MESSAGES ===
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
        };
        write!(f, "{}", text)
    }
}
