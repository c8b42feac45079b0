#[derive(Debug, Clone)]
pub enum Message {
    // === READING CLOCK MESSAGES ===
    ReadingStarted(String),               // title
    ReadingAlreadyActive(String, String), // title, elapsed
    ReadingPaused(String),                // elapsed
    ReadingResumed(String),               // elapsed
    ReadingCancelled,
    NoActiveRun,
    RunStatusPaused(String, String),  // title, elapsed
    RunStatusRunning(String, String), // title, elapsed
    RunStatusPausedHint(String),      // elapsed
    SessionRecorded(u32, String, String), // pages, duration, speed
    BookFinished(String),
    UnknownBook,
    WatchHeader(String),
    WatchStopped,

    // === BOOK MESSAGES ===
    BookAdded(String, i64),
    NoBooks,
    BookNotFound(i64),
    BookArchived(String),
    BookUnarchived(String, String), // title, status
    BookIsArchived(String),

    // === SESSION MESSAGES ===
    NoSessions,
    SessionsHeader,
    InvalidLocalTime(String),

    // === STATS MESSAGES ===
    StatsHeader(String, String), // period, anchor
    GoalsHeader,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleGoals,
    ConfigModuleTimer,
    PromptSelectModules,
    PromptDailyPages,
    PromptWeeklyPages,
    PromptMonthlyBooks,
    PromptYearlyBooks,
    PromptRefreshInterval,

    // === RESET MESSAGES ===
    ConfirmClearAllData,
    OpenRunWillBeDiscarded(String), // title
    AllDataCleared,
    OperationCancelled,

    // === MIGRATION MESSAGES ===
    DatabaseUpToDate,
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
}
