use super::*;

#[test]
fn parses_batch_with_default_output() {
    let cli =
        Cli::try_parse_from(["utilix", "batch", "parcels.xlsx"]).expect("expected valid cli args");

    match cli.command {
        Commands::Batch {
            input,
            output,
            dry_run,
        } => {
            assert_eq!(input, PathBuf::from("parcels.xlsx"));
            assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT_FILE));
            assert!(!dry_run);
        }
        other => panic!("expected batch command, got {other:?}"),
    }
}

#[test]
fn parses_batch_output_and_dry_run() {
    let cli = Cli::try_parse_from([
        "utilix",
        "batch",
        "parcels.csv",
        "--output",
        "out.csv",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Batch { ref output, dry_run: true, .. } if output == &PathBuf::from("out.csv")
    ));
}

#[test]
fn batch_requires_input() {
    assert!(Cli::try_parse_from(["utilix", "batch"]).is_err());
}

#[test]
fn parses_lookup_with_optional_fields() {
    let cli = Cli::try_parse_from([
        "utilix",
        "lookup",
        "--apn",
        "12-34",
        "--county",
        "Lee",
        "--address",
        "1 Main St",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Lookup {
            ref apn,
            ref county,
            address: Some(ref a),
            state: None,
        } if apn == "12-34" && county == "Lee" && a == "1 Main St"
    ));
}

#[test]
fn lookup_requires_county() {
    assert!(Cli::try_parse_from(["utilix", "lookup", "--apn", "1"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["utilix"]).is_err());
}

#[test]
fn resolve_aliases_defaults_without_path() {
    let config = test_config(None);
    let table = resolve_aliases(&config).unwrap();
    assert_eq!(table, AliasTable::default());
}

#[test]
fn resolve_aliases_reports_missing_file() {
    let config = test_config(Some(PathBuf::from("/nonexistent/aliases.yaml")));
    assert!(resolve_aliases(&config).is_err());
}

#[test]
fn build_client_requires_credentials() {
    let Err(err) = build_client(&test_config(None)) else {
        panic!("expected build_client to fail without credentials");
    };
    assert!(err.to_string().contains("UTILIX_API_BASE"), "got: {err}");
}

#[test]
fn build_client_accepts_configured_credentials() {
    let mut config = test_config(None);
    config.api_base = Some("https://utilix.example.com".to_string());
    config.api_token = Some("secret".to_string());
    assert!(build_client(&config).is_ok());
}

fn test_config(aliases_path: Option<PathBuf>) -> AppConfig {
    AppConfig {
        api_base: None,
        api_token: None,
        env: utilix_core::Environment::Test,
        log_level: "info".to_string(),
        default_state: "FL".to_string(),
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
        user_agent: "utilix-test/0.1".to_string(),
        inter_request_delay_ms: 0,
        aliases_path,
    }
}
