#[cfg(test)]
mod tests {
    use bookking::db::db::Db;
    use bookking::db::library::SqliteLibrary;
    use bookking::libs::book::{Book, BookStatus, NewBook};
    use bookking::libs::error::TrackerError;
    use bookking::libs::library::Library;
    use bookking::libs::session::{reading_speed, PageRange, SessionAggregator, SessionRecord};
    use bookking::libs::timer::FinishedRun;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use test_context::{test_context, TestContext};

    struct SessionTestContext {
        library: SqliteLibrary,
        aggregator: SessionAggregator<SqliteLibrary>,
        book: Book,
    }

    impl TestContext for SessionTestContext {
        fn setup() -> Self {
            let db = Db::open_in_memory().unwrap();
            let library = SqliteLibrary::new(&db);
            let book = library.add_book(&NewBook::new("Dune", "Frank Herbert", 1, 400), t0()).unwrap();
            SessionTestContext {
                aggregator: SessionAggregator::new(library.clone()),
                library,
                book,
            }
        }
    }

    impl SessionTestContext {
        fn reload(&self) -> Book {
            self.library.book(self.book.id).unwrap().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap()
    }

    fn run(start: DateTime<Utc>, seconds: i64) -> FinishedRun {
        FinishedRun {
            started_at: start,
            finished_at: start + Duration::seconds(seconds),
            elapsed_seconds: seconds as u64,
        }
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_session_advances_book(ctx: &mut SessionTestContext) {
        let pages = PageRange::continuing(&ctx.book, 30);
        let session = ctx.aggregator.record_session(ctx.book.id, &run(t0(), 1800), pages).unwrap();

        assert_eq!(session.start_page, 1);
        assert_eq!(session.end_page, 30);
        assert_eq!(session.pages_read, 30);
        assert_eq!(session.duration_seconds, Some(1800));
        assert_eq!(session.reading_speed, 1.0);
        assert_eq!(session.start_time, t0());
        assert_eq!(session.end_time, t0() + Duration::seconds(1800));

        let book = ctx.reload();
        assert_eq!(book.current_page, 31);
        assert_eq!(book.status, BookStatus::Reading);
        assert_eq!(book.date_started, Some(t0()));
        assert_eq!(book.date_finished, None);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_consecutive_sessions_continue_where_the_last_stopped(ctx: &mut SessionTestContext) {
        ctx.aggregator
            .record_session(ctx.book.id, &run(t0(), 600), PageRange::continuing(&ctx.book, 10))
            .unwrap();

        let book = ctx.reload();
        let later = t0() + Duration::days(1);
        let second = ctx
            .aggregator
            .record_session(book.id, &run(later, 600), PageRange::continuing(&book, 25))
            .unwrap();

        assert_eq!(second.start_page, 11);
        assert_eq!(second.pages_read, 15);
        let book = ctx.reload();
        assert_eq!(book.current_page, 26);
        // The start date is set once
        assert_eq!(book.date_started, Some(t0()));
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_reaching_last_page_finishes_book(ctx: &mut SessionTestContext) {
        let session_run = run(t0(), 7200);
        ctx.aggregator
            .record_session(ctx.book.id, &session_run, PageRange::continuing(&ctx.book, 400))
            .unwrap();

        let book = ctx.reload();
        assert_eq!(book.status, BookStatus::Finished);
        assert_eq!(book.current_page, 400);
        assert_eq!(book.date_finished, Some(session_run.finished_at));
        assert_eq!(book.progress_percent(), 100);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_finish_date_is_not_overwritten(ctx: &mut SessionTestContext) {
        let first = run(t0(), 7200);
        ctx.aggregator
            .record_session(ctx.book.id, &first, PageRange::continuing(&ctx.book, 400))
            .unwrap();

        // Re-reading the last page later on
        let book = ctx.reload();
        ctx.aggregator
            .record_session(book.id, &run(t0() + Duration::days(3), 60), PageRange::continuing(&book, 400))
            .unwrap();

        assert_eq!(ctx.reload().date_finished, Some(first.finished_at));
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_end_page_before_current_page_is_rejected(ctx: &mut SessionTestContext) {
        ctx.aggregator
            .record_session(ctx.book.id, &run(t0(), 600), PageRange::continuing(&ctx.book, 50))
            .unwrap();
        let book = ctx.reload();

        let result = ctx.aggregator.record_session(book.id, &run(t0(), 600), PageRange::continuing(&book, 40));
        assert!(matches!(result, Err(TrackerError::InvalidPageRange(_))));

        assert_eq!(ctx.library.sessions(Some(book.id)).unwrap().len(), 1);
        assert_eq!(ctx.reload().current_page, 51);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_end_page_past_last_page_is_rejected(ctx: &mut SessionTestContext) {
        let result = ctx
            .aggregator
            .record_session(ctx.book.id, &run(t0(), 600), PageRange::continuing(&ctx.book, 401));

        assert!(matches!(result, Err(TrackerError::InvalidPageRange(_))));
        assert!(ctx.library.sessions(None).unwrap().is_empty());
        assert_eq!(ctx.reload(), ctx.book);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_unknown_book_is_rejected(ctx: &mut SessionTestContext) {
        let result = ctx.aggregator.record_session(999, &run(t0(), 60), PageRange::new(1, 2));
        assert!(matches!(result, Err(TrackerError::BookNotFound(999))));
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_zero_length_run_has_zero_speed(ctx: &mut SessionTestContext) {
        let session = ctx
            .aggregator
            .record_session(ctx.book.id, &run(t0(), 0), PageRange::continuing(&ctx.book, 5))
            .unwrap();

        assert_eq!(session.duration_seconds, Some(0));
        assert_eq!(session.reading_speed, 0.0);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_backwards_clock_does_not_end_before_start(ctx: &mut SessionTestContext) {
        let skewed = FinishedRun {
            started_at: t0(),
            finished_at: t0() - Duration::seconds(30),
            elapsed_seconds: 0,
        };
        let session = ctx
            .aggregator
            .record_session(ctx.book.id, &skewed, PageRange::continuing(&ctx.book, 3))
            .unwrap();

        assert!(session.end_time >= session.start_time);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_manual_session(ctx: &mut SessionTestContext) {
        let start = t0();
        let end = start + Duration::minutes(45) + Duration::milliseconds(700);
        let session = ctx.aggregator.record_manual_session(ctx.book.id, start, end, 1, 45).unwrap();

        assert_eq!(session.duration_seconds, Some(2700));
        assert_eq!(session.pages_read, 45);
        assert_eq!(session.reading_speed, 1.0);
        assert_eq!(ctx.reload().current_page, 46);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_manual_session_for_earlier_pages_keeps_progress(ctx: &mut SessionTestContext) {
        ctx.aggregator
            .record_session(ctx.book.id, &run(t0(), 600), PageRange::continuing(&ctx.book, 100))
            .unwrap();

        let earlier = t0() - Duration::days(10);
        ctx.aggregator
            .record_manual_session(ctx.book.id, earlier, earlier + Duration::minutes(20), 10, 20)
            .unwrap();

        let book = ctx.reload();
        assert_eq!(book.current_page, 101);
        assert_eq!(ctx.library.sessions(Some(book.id)).unwrap().len(), 2);
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_manual_session_needs_end_after_start(ctx: &mut SessionTestContext) {
        let result = ctx.aggregator.record_manual_session(ctx.book.id, t0(), t0(), 1, 5);
        assert!(matches!(result, Err(TrackerError::InvalidSession(_))));

        let result = ctx
            .aggregator
            .record_manual_session(ctx.book.id, t0(), t0() - Duration::minutes(1), 1, 5);
        assert!(matches!(result, Err(TrackerError::InvalidSession(_))));
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_manual_session_pages_must_fit_book(ctx: &mut SessionTestContext) {
        let end = t0() + Duration::minutes(10);
        let inverted = ctx.aggregator.record_manual_session(ctx.book.id, t0(), end, 20, 10);
        assert!(matches!(inverted, Err(TrackerError::InvalidPageRange(_))));

        let outside = ctx.aggregator.record_manual_session(ctx.book.id, t0(), end, 390, 420);
        assert!(matches!(outside, Err(TrackerError::InvalidPageRange(_))));

        assert!(ctx.library.sessions(None).unwrap().is_empty());
    }

    #[test_context(SessionTestContext)]
    #[test]
    fn test_missing_duration_falls_back_to_timestamps(ctx: &mut SessionTestContext) {
        let legacy = SessionRecord {
            id: 0,
            book_id: ctx.book.id,
            start_time: t0(),
            end_time: t0() + Duration::minutes(20),
            duration_seconds: None,
            start_page: 1,
            end_page: 10,
            pages_read: 10,
            reading_speed: 0.5,
        };
        ctx.library.import_session(&legacy).unwrap();

        let stored = &ctx.library.sessions(Some(ctx.book.id)).unwrap()[0];
        assert_eq!(stored.duration_seconds, None);
        assert_eq!(stored.duration_secs(), 1200);
    }

    #[test]
    fn test_reading_speed_rounding() {
        assert_eq!(reading_speed(7, 180), 2.3);
        assert_eq!(reading_speed(30, 1800), 1.0);
        assert_eq!(reading_speed(1, 3600), 0.0);
        assert_eq!(reading_speed(10, 0), 0.0);
    }

    #[test]
    fn test_page_range_is_inclusive() {
        assert_eq!(PageRange::new(12, 12).pages_read(), 1);
        assert_eq!(PageRange::new(12, 30).pages_read(), 19);
    }
}
