//! CLI Tests

#[cfg(test)]
mod tests {
    use crate::cli::{execute, parse_filter, read_concepts, Cli, CliError, Commands, OutputFormat};
    use clap::Parser;
    use glyphh_core::Value;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const SCHEMA: &str = r#"
dimension: 4096
seed: 42
layers:
  - name: audit
    segments:
      - name: event
        roles:
          - name: action
          - name: actor
            similarity_weight: 0.8
"#;

    const CONCEPTS: &str = r#"[
  {"name": "e1", "attributes": {"action": "create", "actor": "alice", "severity": "low"}},
  {"name": "e2", "attributes": {"action": "create", "actor": "bob", "severity": "high"}},
  {"name": "e3", "attributes": {"action": "delete", "actor": "carol", "severity": "high"}}
]"#;

    const INTENTS: &str = r#"[
  {
    "intent_type": "billing_issue",
    "example_phrases": ["charged twice", "wrong amount", "refund request"],
    "query_template": {"operation": "route", "team": "Finance Support"}
  }
]"#;

    const SEQUENCE: &str = r#"[
  {"name": "full", "attributes": {"action": "in_stock", "actor": "warehouse"}},
  {"name": "low", "attributes": {"action": "reorder", "actor": "buyer"}},
  {"name": "empty", "attributes": {"action": "out_of_stock", "actor": "nobody"}}
]"#;

    fn workspace() -> TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();
        std::fs::write(dir.path().join("concepts.json"), CONCEPTS).unwrap();
        std::fs::write(dir.path().join("intents.json"), INTENTS).unwrap();
        std::fs::write(dir.path().join("sequence.json"), SEQUENCE).unwrap();
        dir
    }

    fn arg(dir: &Path, file: &str) -> String {
        dir.join(file).display().to_string()
    }

    async fn run(args: &[&str]) -> anyhow::Result<String> {
        let mut argv = vec!["glyphh"];
        argv.extend_from_slice(args);
        execute(Cli::try_parse_from(argv)?).await
    }

    async fn build(dir: &Path) -> String {
        let model = arg(dir, "audit.glyphh");
        run(&[
            "build",
            "--schema",
            &arg(dir, "schema.yaml"),
            "--concepts",
            &arg(dir, "concepts.json"),
            "--out",
            &model,
            "--name",
            "audit_trail",
            "--intents",
            &arg(dir, "intents.json"),
            "--metadata",
            "domain=compliance",
        ])
        .await
        .unwrap();
        model
    }

    /// Test CliError display implementations
    #[test]
    fn test_cli_error_display() {
        let error = CliError::InvalidFilter("nokey".to_string());
        assert_eq!(format!("{}", error), "Invalid filter 'nokey': expected key=value");
        assert_eq!(CliError::NoIntents.to_string(), "Model has no intent patterns");
    }

    /// Test argument parsing defaults
    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["glyphh", "search", "m.glyphh", "deep learning"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Pretty);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "deep learning");
                assert_eq!(args.top_k, 5);
                assert!(args.filters.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    /// Test global flags after the subcommand
    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "glyphh", "predict", "--sequence", "s.json", "--from", "a", "--steps", "3", "--output", "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.verbose);
        match cli.command {
            Commands::Predict(args) => {
                assert_eq!(args.steps, 3);
                assert_eq!(args.beam_width, 3);
                assert!(!args.no_drift_reduction);
                assert_eq!(args.edge_type, "transition");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    /// Test missing required arguments
    #[test]
    fn test_parse_requires_concepts() {
        assert!(Cli::try_parse_from(["glyphh", "build", "--out", "m.glyphh"]).is_err());
    }

    /// Test filter value typing
    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("type=technique").unwrap(),
            ("type".to_string(), Value::from("technique"))
        );
        assert_eq!(parse_filter("year=2012").unwrap().1, Value::from(2012));
        assert_eq!(parse_filter("active=true").unwrap().1, Value::from(true));
        assert_eq!(parse_filter("note=a=b").unwrap().1, Value::from("a=b"));
        assert!(matches!(parse_filter("novalue"), Err(CliError::InvalidFilter(_))));
        assert!(matches!(parse_filter("=x"), Err(CliError::InvalidFilter(_))));
    }

    /// Test concept file validation
    #[test]
    fn test_read_concepts() {
        let dir = workspace();
        let concepts = read_concepts(&dir.path().join("concepts.json")).unwrap();
        assert_eq!(concepts.len(), 3);
        assert_eq!(concepts[0].get("actor"), Some(&Value::from("alice")));

        std::fs::write(dir.path().join("bad.json"), r#"{"name": "x"}"#).unwrap();
        assert!(read_concepts(&dir.path().join("bad.json")).is_err());
    }

    /// Test build then inspect
    #[tokio::test]
    async fn test_build_and_inspect() {
        let dir = workspace();
        let model = build(dir.path()).await;

        let pretty = run(&["inspect", &model]).await.unwrap();
        assert!(pretty.contains("Model: audit_trail"));
        assert!(pretty.contains("Dimension: 4096"));
        assert!(pretty.contains("Glyphs: 3"));
        assert!(pretty.contains("domain: compliance"));
        assert!(pretty.contains("billing_issue"));

        let json = run(&["inspect", &model, "--output", "json"]).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["concepts"], serde_json::json!(["e1", "e2", "e3"]));
        assert_eq!(parsed["layers"], serde_json::json!(["audit"]));
    }

    /// Test search with filters and json output
    #[tokio::test]
    async fn test_search() {
        let dir = workspace();
        let model = build(dir.path()).await;

        let json = run(&["search", &model, "create", "--top-k", "2", "--output", "json"])
            .await
            .unwrap();
        let hits: serde_json::Value = serde_json::from_str(&json).unwrap();
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["concept"], "e1");
        assert_eq!(hits[0]["attributes"]["actor"], "alice");

        let filtered = run(&["search", &model, "create", "--filter", "severity=high", "--output", "json"])
            .await
            .unwrap();
        let hits: serde_json::Value = serde_json::from_str(&filtered).unwrap();
        assert!(hits
            .as_array()
            .unwrap()
            .iter()
            .all(|h| h["attributes"]["severity"] == "high"));
    }

    /// Test intent classification
    #[tokio::test]
    async fn test_intent() {
        let dir = workspace();
        let model = build(dir.path()).await;

        let json = run(&["intent", &model, "I was charged twice", "--output", "json"])
            .await
            .unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["intent_type"], "billing_issue");
        assert_eq!(report["structured_query"]["team"], "Finance Support");
    }

    /// Test intent without registered patterns
    #[tokio::test]
    async fn test_intent_requires_patterns() {
        let dir = workspace();
        let model = arg(dir.path(), "plain.glyphh");
        run(&["build", "--schema", &arg(dir.path(), "schema.yaml"), "--concepts", &arg(dir.path(), "concepts.json"), "--out", &model])
            .await
            .unwrap();

        let err = run(&["intent", &model, "anything"]).await.unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>(), Some(&CliError::NoIntents));
    }

    /// Test prediction over a sequence
    #[tokio::test]
    async fn test_predict() {
        let dir = workspace();
        let json = run(&[
            "predict",
            "--schema",
            &arg(dir.path(), "schema.yaml"),
            "--sequence",
            &arg(dir.path(), "sequence.json"),
            "--from",
            "full",
            "--steps",
            "2",
            "--beam-width",
            "2",
            "--output",
            "json",
        ])
        .await
        .unwrap();
        let predictions: serde_json::Value = serde_json::from_str(&json).unwrap();
        let predictions = predictions.as_array().unwrap();
        assert!(!predictions.is_empty() && predictions.len() <= 2);
        assert_eq!(predictions[0]["concept"], "empty");
        assert_eq!(predictions[0]["path"], serde_json::json!(["low", "empty"]));
    }

    /// Test unknown start concept
    #[tokio::test]
    async fn test_predict_unknown_concept() {
        let dir = workspace();
        let err = run(&[
            "predict",
            "--schema",
            &arg(dir.path(), "schema.yaml"),
            "--sequence",
            &arg(dir.path(), "sequence.json"),
            "--from",
            "missing",
        ])
        .await
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CliError>(),
            Some(&CliError::UnknownConcept("missing".to_string()))
        );
    }

    /// Test loading a missing model
    #[tokio::test]
    async fn test_missing_model() {
        let dir = tempdir().unwrap();
        let err = run(&["inspect", &arg(dir.path(), "nope.glyphh")]).await.unwrap_err();
        assert!(err.to_string().contains("loading model"));
    }
}
