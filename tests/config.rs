#[cfg(test)]
mod tests {
    use bookking::libs::config::{Config, GoalsConfig, TimerConfig, CONFIG_FILE_NAME};
    use bookking::libs::data_storage::DataStorage;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Points the data directory at a throwaway location.
    struct ConfigTestContext {
        _temp_dir: TempDir,
        storage: DataStorage,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let storage = DataStorage::at(temp_dir.path().join("bookking"));
            ConfigTestContext {
                _temp_dir: temp_dir,
                storage,
            }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_gives_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.storage).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.goals(), GoalsConfig::default());
        assert_eq!(config.timer().refresh_period(), Duration::from_secs(1));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read(ctx: &mut ConfigTestContext) {
        let config = Config {
            goals: Some(GoalsConfig {
                daily_pages: 50,
                weekly_pages: 300,
                monthly_books: 3,
                yearly_books: 36,
            }),
            timer: Some(TimerConfig { refresh_interval_ms: 500 }),
        };
        config.save_to(&ctx.storage).unwrap();

        assert!(ctx.storage.base_path().join(CONFIG_FILE_NAME).exists());
        assert_eq!(Config::read_from(&ctx.storage).unwrap(), config);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unconfigured_modules_are_omitted(ctx: &mut ConfigTestContext) {
        let config = Config {
            goals: Some(GoalsConfig::default()),
            timer: None,
        };
        config.save_to(&ctx.storage).unwrap();

        let raw = std::fs::read_to_string(ctx.storage.base_path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(raw.contains("daily_pages"));
        assert!(!raw.contains("timer"));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_falls_back_per_module(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        std::fs::write(path, r#"{"timer":{"refresh_interval_ms":250}}"#).unwrap();

        let config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(config.goals(), GoalsConfig::default());
        assert_eq!(config.timer().refresh_period(), Duration::from_millis(250));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_file_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        std::fs::write(path, "{ goals: ").unwrap();

        assert!(Config::read_from(&ctx.storage).is_err());
    }

    #[test]
    fn test_refresh_period_has_a_floor() {
        let timer = TimerConfig { refresh_interval_ms: 10 };
        assert_eq!(timer.refresh_period(), Duration::from_millis(100));
    }
}
