#[cfg(test)]
mod tests {
    use bookking::db::db::Db;
    use bookking::db::kv::SqliteStore;
    use bookking::db::library::SqliteLibrary;
    use bookking::libs::book::{Book, BookStatus, BookUpdate, NewBook};
    use bookking::libs::clock::{Clock, ManualClock};
    use bookking::libs::error::TrackerError;
    use bookking::libs::library::Library;
    use bookking::libs::screen::{NavigationState, View, SCREEN_STATE_KEY};
    use bookking::libs::session::{NewSession, SessionRecord};
    use bookking::libs::store::KeyValueStore;
    use bookking::libs::ticker::{ManualTicker, Ticker};
    use bookking::libs::timer::{RunState, TIMER_ACTIVE_KEY};
    use bookking::libs::tracker::{BeginOutcome, ReadingTracker, TIMER_BOOK_KEY};
    use chrono::{DateTime, Duration, Utc};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    type Tracker = ReadingTracker<SqliteStore, ManualClock, SqliteLibrary>;

    const T0: i64 = 1_710_525_600_000;

    struct TrackerTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
        clock: ManualClock,
    }

    impl TestContext for TrackerTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("bookking.db");
            TrackerTestContext {
                _temp_dir: temp_dir,
                db_path,
                clock: ManualClock::at_millis(T0),
            }
        }
    }

    /// Library whose session table rejects every write.
    struct ReadOnlySessions(SqliteLibrary);

    impl Library for ReadOnlySessions {
        fn books(&self) -> Result<Vec<Book>, TrackerError> {
            self.0.books()
        }

        fn book(&self, id: i64) -> Result<Option<Book>, TrackerError> {
            self.0.book(id)
        }

        fn add_book(&self, book: &NewBook, created_at: DateTime<Utc>) -> Result<Book, TrackerError> {
            self.0.add_book(book, created_at)
        }

        fn update_book(&self, id: i64, update: &BookUpdate) -> Result<(), TrackerError> {
            self.0.update_book(id, update)
        }

        fn add_session(&self, _session: &NewSession) -> Result<SessionRecord, TrackerError> {
            Err(TrackerError::InvalidSession("disk full".to_string()))
        }

        fn sessions(&self, book_id: Option<i64>) -> Result<Vec<SessionRecord>, TrackerError> {
            self.0.sessions(book_id)
        }

        fn clear_all(&self) -> Result<(), TrackerError> {
            self.0.clear_all()
        }
    }

    impl TrackerTestContext {
        /// Opens the database and builds a tracker, as a fresh process would.
        fn launch(&self) -> (Tracker, ManualTicker) {
            let db = Db::open(&self.db_path).unwrap();
            let ticker = ManualTicker::new();
            let mut tracker = ReadingTracker::new(SqliteStore::new(&db), self.clock.clone(), Box::new(ticker.clone()), SqliteLibrary::new(&db));
            tracker.launch().unwrap();
            (tracker, ticker)
        }

        fn add_book(&self, tracker: &Tracker, title: &str, last_page: u32) -> i64 {
            let book = tracker
                .library()
                .add_book(&NewBook::new(title, "", 1, last_page), self.clock.now())
                .unwrap();
            book.id
        }

        fn key(&self, key: &str) -> Option<String> {
            let db = Db::open(&self.db_path).unwrap();
            SqliteStore::new(&db).get(key).unwrap()
        }
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_begin_reading_starts_run(ctx: &mut TrackerTestContext) {
        let (mut tracker, ticker) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);

        assert_eq!(tracker.begin_reading(book).unwrap(), BeginOutcome::Started);

        let status = tracker.status().unwrap();
        assert!(status.is_active());
        assert_eq!(status.book_id, Some(book));
        assert_eq!(tracker.screen().navigation().view, View::Reading);
        assert_eq!(ticker.starts(), 1);
        assert_eq!(ctx.key(TIMER_BOOK_KEY), Some(book.to_string()));
        assert!(ctx.key(SCREEN_STATE_KEY).is_some());
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_run_survives_restart(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();
        drop(tracker);

        ctx.clock.advance(Duration::minutes(2));
        let (mut tracker, ticker) = ctx.launch();
        let status = tracker.status().unwrap();

        assert!(matches!(status.state, RunState::Running { .. }));
        assert_eq!(status.elapsed, 120);
        assert_eq!(status.book_id, Some(book));
        // The fresh snapshot put the user back on the reading view
        assert_eq!(tracker.screen().navigation().view, View::Reading);
        assert_eq!(ctx.key(SCREEN_STATE_KEY), None);
        assert_eq!(ticker.starts(), 0);

        tracker.navigate(View::Reading, Some(book)).unwrap();
        assert_eq!(ticker.starts(), 1);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_stale_screen_is_not_restored_after_restart(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();
        drop(tracker);

        ctx.clock.advance(Duration::minutes(30));
        let (tracker, _) = ctx.launch();

        assert_eq!(tracker.screen().navigation().view, View::Main);
        assert_eq!(tracker.status().unwrap().elapsed, 1800);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_complete_reading_records_session(ctx: &mut TrackerTestContext) {
        let (mut tracker, ticker) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();

        ctx.clock.advance(Duration::minutes(25));
        let completion = tracker.complete_reading(50).unwrap();

        assert_eq!(completion.run.elapsed_seconds, 1500);
        assert_eq!(completion.session.start_page, 1);
        assert_eq!(completion.session.pages_read, 50);
        assert_eq!(completion.session.reading_speed, 2.0);
        assert_eq!(completion.book.current_page, 51);
        assert_eq!(completion.book.status, BookStatus::Reading);

        assert!(!tracker.status().unwrap().is_active());
        assert!(!ticker.is_running());
        assert_eq!(tracker.screen().navigation().view, View::BookDetails);
        assert_eq!(ctx.key(TIMER_ACTIVE_KEY), None);
        assert_eq!(ctx.key(TIMER_BOOK_KEY), None);
        assert_eq!(ctx.key(SCREEN_STATE_KEY), None);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_invalid_end_page_keeps_run_open(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();
        ctx.clock.advance(Duration::minutes(5));

        let result = tracker.complete_reading(401);
        assert!(matches!(result, Err(TrackerError::InvalidPageRange(_))));

        let status = tracker.status().unwrap();
        assert!(status.is_active());
        assert_eq!(status.elapsed, 300);
        assert!(tracker.library().sessions(None).unwrap().is_empty());
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_second_book_cannot_start_while_reading(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let dune = ctx.add_book(&tracker, "Dune", 400);
        let emma = ctx.add_book(&tracker, "Emma", 300);
        tracker.begin_reading(dune).unwrap();

        ctx.clock.advance(Duration::seconds(42));
        assert!(matches!(tracker.begin_reading(emma), Err(TrackerError::RunAlreadyActive)));
        assert_eq!(tracker.begin_reading(dune).unwrap(), BeginOutcome::Attached { elapsed: 42 });
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_unknown_and_archived_books_cannot_start(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        assert!(matches!(tracker.begin_reading(77), Err(TrackerError::BookNotFound(77))));

        let short = ctx.add_book(&tracker, "Short", 10);
        let start = ctx.clock.now();
        tracker.record_manual_session(short, start, start + Duration::minutes(10), 1, 10).unwrap();
        let finished = tracker.library().book(short).unwrap().unwrap();
        assert_eq!(finished.status, BookStatus::Finished);
        tracker.library().update_book(short, &finished.archive(start).unwrap()).unwrap();

        let result = tracker.begin_reading(short);
        assert!(matches!(
            result,
            Err(TrackerError::IllegalTransition {
                from: BookStatus::Archived,
                to: BookStatus::Reading
            })
        ));
        assert!(!tracker.status().unwrap().is_active());
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_abandon_reading_records_nothing(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();
        ctx.clock.advance(Duration::minutes(3));

        tracker.abandon_reading().unwrap();
        tracker.abandon_reading().unwrap();

        assert!(!tracker.status().unwrap().is_active());
        assert!(tracker.library().sessions(None).unwrap().is_empty());
        assert_eq!(ctx.key(TIMER_BOOK_KEY), None);
        assert_eq!(tracker.library().book(book).unwrap().unwrap().current_page, 1);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_pause_survives_restart(ctx: &mut TrackerTestContext) {
        let (mut tracker, _) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();
        ctx.clock.advance(Duration::seconds(90));
        tracker.pause().unwrap();
        drop(tracker);

        ctx.clock.advance(Duration::hours(8));
        let (mut tracker, _) = ctx.launch();
        let status = tracker.status().unwrap();
        assert!(status.is_paused());
        assert_eq!(status.elapsed, 90);

        tracker.resume().unwrap();
        ctx.clock.advance(Duration::seconds(30));
        let completion = tracker.complete_reading(10).unwrap();
        assert_eq!(completion.session.duration_seconds, Some(120));
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_hidden_and_visible_again(ctx: &mut TrackerTestContext) {
        let (mut tracker, ticker) = ctx.launch();
        let book = ctx.add_book(&tracker, "Dune", 400);
        tracker.begin_reading(book).unwrap();

        tracker.visibility_changed(false).unwrap();
        assert!(!ticker.is_running());
        assert!(ctx.key(SCREEN_STATE_KEY).is_some());

        ctx.clock.advance(Duration::minutes(4));
        let restored = tracker.visibility_changed(true).unwrap().unwrap();

        assert_eq!(restored.view, View::Reading);
        assert_eq!(restored.book_id, Some(book));
        assert!(ticker.is_running());
        assert_eq!(tracker.status().unwrap().elapsed, 240);
        assert_eq!(ctx.key(SCREEN_STATE_KEY), None);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_dangling_book_key_is_dropped_on_launch(ctx: &mut TrackerTestContext) {
        {
            let db = Db::open(&ctx.db_path).unwrap();
            SqliteStore::new(&db).set(TIMER_BOOK_KEY, "3").unwrap();
        }

        let (tracker, _) = ctx.launch();
        assert_eq!(tracker.status().unwrap().book_id, None);
        assert_eq!(ctx.key(TIMER_BOOK_KEY), None);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_failed_session_write_keeps_run_open(ctx: &mut TrackerTestContext) {
        let book = {
            let db = Db::open(&ctx.db_path).unwrap();
            let ticker = ManualTicker::new();
            let library = ReadOnlySessions(SqliteLibrary::new(&db));
            let mut tracker = ReadingTracker::new(SqliteStore::new(&db), ctx.clock.clone(), Box::new(ticker), library);
            tracker.launch().unwrap();

            let book = tracker.library().add_book(&NewBook::new("Dune", "", 1, 400), ctx.clock.now()).unwrap().id;
            tracker.begin_reading(book).unwrap();
            ctx.clock.advance(Duration::minutes(30));

            let result = tracker.complete_reading(20);
            assert!(matches!(result, Err(TrackerError::InvalidSession(_))));

            let status = tracker.status().unwrap();
            assert!(status.is_active());
            assert_eq!(status.elapsed, 1800);
            assert_eq!(status.book_id, Some(book));
            assert_eq!(tracker.library().book(book).unwrap().unwrap().current_page, 1);
            book
        };
        assert_eq!(ctx.key(TIMER_ACTIVE_KEY).as_deref(), Some("true"));
        assert_eq!(ctx.key(TIMER_BOOK_KEY), Some(book.to_string()));

        // Once storage works again the same run can still be recorded
        let (mut tracker, _) = ctx.launch();
        let completion = tracker.complete_reading(20).unwrap();
        assert_eq!(completion.session.duration_seconds, Some(1800));
        assert_eq!(completion.book.current_page, 21);
        assert_eq!(tracker.library().sessions(None).unwrap().len(), 1);
    }

    #[test_context(TrackerTestContext)]
    #[test]
    fn test_clear_all_data(ctx: &mut TrackerTestContext) {
        let (mut tracker, ticker) = ctx.launch();
        let dune = ctx.add_book(&tracker, "Dune", 400);
        let emma = ctx.add_book(&tracker, "Emma", 300);
        let start = ctx.clock.now();
        tracker.record_manual_session(emma, start, start + Duration::minutes(10), 1, 12).unwrap();
        tracker.begin_reading(dune).unwrap();
        ctx.clock.advance(Duration::minutes(3));
        assert!(ctx.key(SCREEN_STATE_KEY).is_some());

        tracker.clear_all_data().unwrap();

        let data = tracker.library().data().unwrap();
        assert!(data.books.is_empty());
        assert!(data.sessions.is_empty());
        assert!(!tracker.status().unwrap().is_active());
        assert!(!ticker.is_running());
        assert_eq!(tracker.screen().navigation(), NavigationState::default());
        assert_eq!(ctx.key(TIMER_ACTIVE_KEY), None);
        assert_eq!(ctx.key(TIMER_BOOK_KEY), None);
        assert_eq!(ctx.key(SCREEN_STATE_KEY), None);
        drop(tracker);

        let (tracker, _) = ctx.launch();
        assert!(!tracker.status().unwrap().is_active());
        assert!(tracker.library().books().unwrap().is_empty());
    }
}
