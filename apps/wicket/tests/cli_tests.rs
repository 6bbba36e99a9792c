//! Integration tests for Wicket CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::path::PathBuf;
use tempfile::TempDir;
use wicket::cli::{
    CliError, GlobalOpts, KeyFormat, build_mediator, cmd_batch, cmd_handle, cmd_snapshot_export,
    cmd_snapshot_show, load_snapshot, read_keys, resolve_config,
};
use wicket_core::{CacheSnapshot, MediatorError, formats};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn keys(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|k| (*k).to_string()).collect()
}

/// Create a sample keys JSON file.
fn create_keys_json(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("keys.json");
    std::fs::write(&path, r#"["alpha", "beta", "alpha", "forbidden-x"]"#).unwrap();
    path
}

/// Create a sample keys text file.
fn create_keys_text(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("keys.txt");
    std::fs::write(&path, "alpha\r\n\nbeta\nalpha\nforbidden-x\n").unwrap();
    path
}

// =============================================================================
// HANDLE COMMAND TESTS
// =============================================================================

#[test]
fn test_handle_default_policy() {
    let report = cmd_handle(
        &GlobalOpts::default(),
        &keys(&["forbidden-x", "alpha", "alpha", "beta"]),
    )
    .unwrap();

    assert_eq!(
        report.texts(),
        vec![
            "denied: forbidden-x",
            "processed: alpha",
            "processed: alpha",
            "processed: beta",
        ]
    );
    assert_eq!(report.stats.denied, 1);
    assert_eq!(report.stats.hits, 1);
    assert_eq!(report.stats.constructions, 1);
    assert_eq!(report.stats.invocations, 2);
    assert_eq!(report.stats.cached_entries, 2);
}

#[test]
fn test_handle_only_denied_never_constructs() {
    let report = cmd_handle(&GlobalOpts::default(), &keys(&["forbidden-a", "forbidden-b"])).unwrap();
    assert_eq!(report.stats.constructions, 0);
    assert_eq!(report.stats.cached_entries, 0);
}

#[test]
fn test_handle_custom_deny_replaces_default() {
    let opts = GlobalOpts {
        deny: vec!["secret".to_string()],
        ..GlobalOpts::default()
    };
    let report = cmd_handle(&opts, &keys(&["top-secret", "forbidden-x"])).unwrap();
    assert_eq!(
        report.texts(),
        vec!["denied: top-secret", "processed: forbidden-x"]
    );
}

#[test]
fn test_handle_allow_all() {
    let opts = GlobalOpts {
        allow_all: true,
        ..GlobalOpts::default()
    };
    let report = cmd_handle(&opts, &keys(&["forbidden-x"])).unwrap();
    assert_eq!(report.texts(), vec!["processed: forbidden-x"]);
}

#[test]
fn test_handle_empty_key_fails() {
    let result = cmd_handle(&GlobalOpts::default(), &keys(&["alpha", ""]));
    assert!(matches!(
        result,
        Err(CliError::Mediator(MediatorError::InvalidArgument(_)))
    ));
}

#[test]
fn test_handle_empty_deny_substring_fails() {
    let opts = GlobalOpts {
        deny: vec![String::new()],
        ..GlobalOpts::default()
    };
    let result = cmd_handle(&opts, &keys(&["forbidden-x"]));
    assert!(matches!(
        result,
        Err(CliError::Mediator(MediatorError::InvalidArgument(_)))
    ));
}

#[test]
fn test_handle_bounded_cache() {
    let opts = GlobalOpts {
        capacity: Some(1),
        ..GlobalOpts::default()
    };
    let report = cmd_handle(&opts, &keys(&["alpha", "beta", "alpha"])).unwrap();
    assert_eq!(report.stats.invocations, 3);
    assert_eq!(report.stats.cached_entries, 1);
}

#[test]
fn test_handle_zero_capacity_fails() {
    let opts = GlobalOpts {
        capacity: Some(0),
        ..GlobalOpts::default()
    };
    assert!(cmd_handle(&opts, &keys(&["alpha"])).is_err());
}

#[test]
fn test_report_serializes_to_json() {
    let report = cmd_handle(&GlobalOpts::default(), &keys(&["alpha", "forbidden-x"])).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["responses"][0]["key"], "alpha");
    assert_eq!(json["responses"][0]["response"]["outcome"], "served");
    assert_eq!(json["responses"][0]["response"]["source"], "delegate");
    assert_eq!(json["responses"][1]["response"]["outcome"], "denied");
    assert_eq!(json["stats"]["denied"], 1);
}

// =============================================================================
// REDB PERSISTENCE TESTS
// =============================================================================

#[test]
fn test_db_memo_survives_runs() {
    let temp = create_temp_dir();
    let opts = GlobalOpts {
        db: Some(temp.path().join("memo.redb")),
        ..GlobalOpts::default()
    };

    let first = cmd_handle(&opts, &keys(&["alpha"])).unwrap();
    assert_eq!(first.stats.constructions, 1);

    // Second process: answered from disk, delegate never built.
    let second = cmd_handle(&opts, &keys(&["alpha"])).unwrap();
    assert_eq!(second.texts(), vec!["processed: alpha"]);
    assert_eq!(second.stats.hits, 1);
    assert_eq!(second.stats.constructions, 0);
}

// =============================================================================
// BATCH COMMAND TESTS
// =============================================================================

#[test]
fn test_batch_json_format() {
    let temp = create_temp_dir();
    let file = create_keys_json(&temp);

    let report = cmd_batch(&GlobalOpts::default(), &file, KeyFormat::Json).unwrap();
    assert_eq!(report.responses.len(), 4);
    assert_eq!(report.stats.hits, 1);
    assert_eq!(report.stats.denied, 1);
}

#[test]
fn test_batch_text_format_skips_blank_lines() {
    let temp = create_temp_dir();
    let file = create_keys_text(&temp);

    let parsed = read_keys(&file, KeyFormat::Text).unwrap();
    assert_eq!(parsed, keys(&["alpha", "beta", "alpha", "forbidden-x"]));

    let report = cmd_batch(&GlobalOpts::default(), &file, KeyFormat::Text).unwrap();
    assert_eq!(report.stats.invocations, 2);
}

#[test]
fn test_batch_invalid_json() {
    let temp = create_temp_dir();
    let bad_file = temp.path().join("bad.json");
    std::fs::write(&bad_file, "not valid json").unwrap();

    let result = cmd_batch(&GlobalOpts::default(), &bad_file, KeyFormat::Json);
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_batch_missing_file() {
    let temp = create_temp_dir();
    let result = cmd_batch(
        &GlobalOpts::default(),
        &temp.path().join("missing.txt"),
        KeyFormat::Text,
    );
    assert!(matches!(result, Err(CliError::Io { .. })));
}

// =============================================================================
// CONFIG TESTS
// =============================================================================

#[test]
fn test_config_file_with_flag_override() {
    let temp = create_temp_dir();
    let config_path = temp.path().join("wicket.json");
    std::fs::write(
        &config_path,
        r#"{"deny_substrings": ["internal"], "capacity": 16}"#,
    )
    .unwrap();

    let opts = GlobalOpts {
        config: Some(config_path),
        capacity: Some(2),
        ..GlobalOpts::default()
    };
    let config = resolve_config(&opts).unwrap();
    assert_eq!(config.deny_substrings, vec!["internal".to_string()]);
    assert_eq!(config.capacity, Some(2));

    let report = cmd_handle(&opts, &keys(&["internal-x", "forbidden-x"])).unwrap();
    assert_eq!(
        report.texts(),
        vec!["denied: internal-x", "processed: forbidden-x"]
    );
}

#[test]
fn test_config_file_empty_deny_substring_fails() {
    let temp = create_temp_dir();
    let config_path = temp.path().join("wicket.json");
    std::fs::write(&config_path, r#"{"deny_substrings": [""]}"#).unwrap();

    let opts = GlobalOpts {
        config: Some(config_path),
        ..GlobalOpts::default()
    };
    assert!(matches!(
        resolve_config(&opts),
        Err(CliError::Mediator(MediatorError::InvalidArgument(_)))
    ));
}

#[test]
fn test_config_file_misspelled_key_fails() {
    let temp = create_temp_dir();
    let config_path = temp.path().join("wicket.json");
    std::fs::write(&config_path, r#"{"deny_substring": ["internal"]}"#).unwrap();

    let opts = GlobalOpts {
        config: Some(config_path),
        ..GlobalOpts::default()
    };
    assert!(matches!(resolve_config(&opts), Err(CliError::Json(_))));
}

#[test]
fn test_config_file_invalid() {
    let temp = create_temp_dir();
    let config_path = temp.path().join("wicket.json");
    std::fs::write(&config_path, "{").unwrap();

    let opts = GlobalOpts {
        config: Some(config_path),
        ..GlobalOpts::default()
    };
    assert!(resolve_config(&opts).is_err());
}

// =============================================================================
// SNAPSHOT TESTS
// =============================================================================

#[test]
fn test_save_then_warm() {
    let temp = create_temp_dir();
    let snapshot_path = temp.path().join("memo.wckt");

    let save_opts = GlobalOpts {
        save: Some(snapshot_path.clone()),
        ..GlobalOpts::default()
    };
    cmd_handle(&save_opts, &keys(&["alpha", "beta", "forbidden-x"])).unwrap();

    let snapshot = load_snapshot(&snapshot_path).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("alpha"), Some("processed: alpha"));

    let warm_opts = GlobalOpts {
        warm: Some(snapshot_path),
        ..GlobalOpts::default()
    };
    let report = cmd_handle(&warm_opts, &keys(&["alpha", "beta"])).unwrap();
    assert_eq!(report.stats.hits, 2);
    assert_eq!(report.stats.constructions, 0);
}

#[test]
fn test_snapshot_export_from_db_and_show() {
    let temp = create_temp_dir();
    let opts = GlobalOpts {
        db: Some(temp.path().join("memo.redb")),
        ..GlobalOpts::default()
    };
    cmd_handle(&opts, &keys(&["beta", "alpha"])).unwrap();

    let output = temp.path().join("export.wckt");
    let exported = cmd_snapshot_export(&opts, &output).unwrap();
    assert_eq!(exported.len(), 2);

    let shown = cmd_snapshot_show(&GlobalOpts::default(), &output).unwrap();
    assert_eq!(shown, exported);
    assert_eq!(shown.entries()[0].key, "alpha");
}

#[test]
fn test_warm_rejects_corrupt_snapshot() {
    let temp = create_temp_dir();
    let path = temp.path().join("corrupt.wckt");
    std::fs::write(&path, b"NOPE").unwrap();

    let opts = GlobalOpts {
        warm: Some(path),
        ..GlobalOpts::default()
    };
    assert!(matches!(build_mediator(&opts), Err(CliError::Snapshot(_))));
}

#[test]
fn test_warm_respects_policy() {
    let temp = create_temp_dir();
    let path = temp.path().join("handmade.wckt");
    let snapshot = CacheSnapshot::from_pairs([(
        "forbidden-x".to_string(),
        "should not leak".to_string(),
    )]);
    std::fs::write(&path, formats::encode(&snapshot).unwrap()).unwrap();

    let opts = GlobalOpts {
        warm: Some(path),
        ..GlobalOpts::default()
    };
    let report = cmd_handle(&opts, &keys(&["forbidden-x"])).unwrap();
    assert_eq!(report.texts(), vec!["denied: forbidden-x"]);
}
