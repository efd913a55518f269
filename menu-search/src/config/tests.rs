#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigError, ConfigLoader, LogFormat, LogLevel, MenuSearchConfig,
        validation,
    };
    use crate::search::RankingWeights;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = MenuSearchConfig::default();
        assert_eq!(config.storage.catalogue_file, "menus.json");
        assert_eq!(config.storage.weights_file, "ranking_weights.json");
        assert_eq!(config.storage.feedback_file, "feedback.json");
        assert_eq!(config.storage.staleness, Duration::from_secs(300));
        assert_eq!(config.ranking.feedback_batch_size, 100);
        assert_eq!(config.ranking.initial_weights, RankingWeights::default());
        assert_eq!(config.enhancer.max_query_length, 1000);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.search.similarity_top_k, 3);
        assert_eq!(config.search.similarity_threshold, 0.5);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_data_dir("/tmp/test_data")
            .with_staleness(Duration::from_secs(10))
            .with_feedback_batch_size(20)
            .with_max_results(5)
            .with_log_level(LogLevel::Debug)
            .build()
            .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/test_data"));
        assert_eq!(
            config.storage.catalogue_path(),
            PathBuf::from("/tmp/test_data/menus.json")
        );
        assert_eq!(config.storage.staleness, Duration::from_secs(10));
        assert_eq!(config.ranking.feedback_batch_size, 20);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_validation() {
        assert!(ConfigBuilder::new().build().is_ok());
        assert!(validation::validate_config(&MenuSearchConfig::default()).is_ok());

        let cases = [
            ConfigBuilder::new().with_data_dir(""),
            ConfigBuilder::new().with_catalogue_file(" "),
            ConfigBuilder::new().with_weights_file("menus.json"),
            ConfigBuilder::new().with_feedback_file(""),
            ConfigBuilder::new().with_feedback_file("ranking_weights.json"),
            ConfigBuilder::new().with_feedback_batch_size(0),
            ConfigBuilder::new().with_max_query_length(0),
            ConfigBuilder::new().with_max_results(0),
            ConfigBuilder::new().with_similarity(0, 0.5),
            ConfigBuilder::new().with_similarity(3, 1.5),
            ConfigBuilder::new().with_initial_weights(RankingWeights {
                keyword_match: 0.9,
                ..Default::default()
            }),
        ];
        for builder in cases {
            assert!(matches!(
                builder.build(),
                Err(ConfigError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_predefined_configs() {
        let dev = ConfigBuilder::development().build().unwrap();
        let test = ConfigBuilder::testing().build().unwrap();

        assert_eq!(dev.logging.level, LogLevel::Debug);
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(dev.storage.staleness, Duration::from_secs(5));

        assert_eq!(test.storage.data_dir, PathBuf::from("./test_data"));
        assert!(!test.ranking.persist_weights);
    }

    #[test]
    fn test_config_serialization() {
        let config = ConfigBuilder::new()
            .with_data_dir("/tmp/test_data")
            .with_staleness(Duration::from_secs(90))
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MenuSearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_loader_reads_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("menu-search.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/srv/menus"
staleness = "2m"

[search]
max_results = 3
"#,
        )
        .unwrap();

        let config = ConfigLoader::new().load_file(&path).unwrap().extract().unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/srv/menus"));
        assert_eq!(config.storage.staleness, Duration::from_secs(120));
        assert_eq!(config.search.max_results, 3);
        // untouched sections keep their defaults
        assert_eq!(config.ranking.feedback_batch_size, 100);
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(matches!(
            ConfigLoader::new().load_file(&path),
            Err(ConfigError::FileLoadError(_))
        ));
        assert!(ConfigLoader::new().load_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_loader_validates() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("menu-search.json");
        std::fs::write(&path, r#"{"search": {"max_results": 0}}"#).unwrap();
        let result = ConfigLoader::new().load_file(&path).unwrap().extract();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
