#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.limits.max_document_chars, 2_000_000);
        assert_eq!(config.scoring.expected_citations, 10);
    }

    #[test]
    fn test_full_file_round_trips_sections() {
        let config = Config::from_toml_str(
            r#"
            [limits]
            max_document_chars = 5000

            [extraction]
            keyword_top_k = 8
            extra_stopwords = ["novel"]

            [scoring]
            expected_citations = 25
            rules_path = "rules.toml"

            [scoring.weights]
            structural = 0.4
            content_quality = 0.2
            citation_adequacy = 0.1
            missing_content = 0.3

            [scoring.deductions]
            critical = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_document_chars, 5000);
        assert_eq!(config.extraction.keyword_top_k, 8);
        assert_eq!(config.extraction.extra_stopwords, vec!["novel".to_string()]);
        assert_eq!(config.scoring.expected_citations, 25);
        assert_eq!(config.scoring.weights.structural, 0.4);
        assert_eq!(config.scoring.deductions.critical, 20.0);
        assert_eq!(config.scoring.deductions.important, 10.0);
        assert_eq!(config.analysis().limits.max_document_chars, 5000);
    }

    #[test]
    fn test_relative_rules_path_resolves_against_config_dir() {
        let mut config = Config::from_toml_str("[scoring]\nrules_path = \"rules.toml\"").unwrap();
        config.resolve_paths(Path::new("/etc/paperlens"));
        assert_eq!(config.scoring.rules_path, Some(PathBuf::from("/etc/paperlens/rules.toml")));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/paperlens.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_unknown_value_types_are_rejected() {
        assert!(Config::from_toml_str("[limits]\nmax_document_chars = \"lots\"").is_err());
    }
}
