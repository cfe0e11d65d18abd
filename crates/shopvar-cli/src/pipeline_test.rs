use std::path::Path;

use shopvar_core::AppConfig;

use super::*;

const SOURCE: &str = "\
Title,Description,Colors,Sizes,SKU,Price,Compare Price
Cotton T-Shirt,Soft cotton tee. Machine washable.,\"Red, Blue, Green\",\"S-4,M-8,L-12,XL-6,XXL-2\",TS001,299,399
Hoodie,,,\"XXL-1,M-2\",HD001,59.00,
,Missing title,,,X1,10,
";

fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        settings_path: dir.join("missing-settings.yaml"),
        ai_api_key: None,
        ai_base_url: "http://localhost:9".to_string(),
        ai_model: "models/test".to_string(),
        ai_request_timeout_secs: 1,
        ai_max_concurrent: 1,
        ai_max_retries: 0,
        ai_retry_backoff_ms: 0,
        ai_inter_request_delay_ms: 0,
    }
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn build_options(dir: &Path, input: PathBuf) -> BuildOptions {
    BuildOptions {
        input,
        output: dir.join("out").join("shopify.csv"),
        report: Some(dir.join("out").join("report.json")),
        edits: None,
        settings: None,
        ai_mode: None,
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

#[tokio::test]
async fn build_writes_csv_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(dir.path(), "products.csv", SOURCE);
    let options = build_options(dir.path(), input);

    run_build(&config, &options).await.expect("build succeeds");

    let csv = std::fs::read_to_string(&options.output).expect("csv written");
    // Header plus 15 tee variants and 2 hoodie variants.
    assert_eq!(csv.lines().count(), 1 + 15 + 2);
    assert!(csv.starts_with("Handle,Title,Body (HTML)"));

    let report = std::fs::read_to_string(options.report.as_ref().expect("report path"))
        .expect("report written");
    assert!(report.contains("\"row_excluded\": 1"), "report: {report}");
}

#[tokio::test]
async fn build_applies_edits_and_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(dir.path(), "products.csv", SOURCE);
    let settings = write(
        dir.path(),
        "settings.yaml",
        "vendor_name: Acme\nsurcharge:\n  enabled: true\n  rules:\n    XXL: 10\n",
    );
    let edits = write(
        dir.path(),
        "edits.yaml",
        "- sku: HD001-XXL\n  price: 70\n- sku: TS001-S-Red\n  quantity: 1\n",
    );
    let mut options = build_options(dir.path(), input);
    options.settings = Some(settings);
    options.edits = Some(edits);

    run_build(&config, &options).await.expect("build succeeds");

    let csv = std::fs::read_to_string(&options.output).expect("csv written");
    assert!(csv.contains("Acme"));
    // Surcharged tee XXL: 299 * 1.10.
    assert!(csv.contains("328.90"), "csv: {csv}");
    // Hand-edited hoodie XXL price wins over the surcharge.
    assert!(csv.contains("70.00"), "csv: {csv}");
    assert!(!csv.contains("64.90"), "csv: {csv}");
}

#[tokio::test]
async fn build_without_key_skips_enrichment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(dir.path(), "products.csv", SOURCE);
    let mut options = build_options(dir.path(), input);
    options.ai_mode = Some(AiMode::Full);

    run_build(&config, &options).await.expect("build succeeds");

    let csv = std::fs::read_to_string(&options.output).expect("csv written");
    assert!(csv.contains("Soft cotton tee. Machine washable."));
}

#[tokio::test]
async fn build_rejects_input_without_processable_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(
        dir.path(),
        "products.csv",
        "Title,Price\nNo price,\n,12.00\n",
    );
    let options = build_options(dir.path(), input);

    let err = run_build(&config, &options).await.unwrap_err();
    assert!(
        err.to_string().contains("no processable rows"),
        "got: {err:?}"
    );
    assert!(!options.output.exists());
}

#[tokio::test]
async fn build_rejects_empty_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(dir.path(), "products.csv", "Title,Price\n");
    let options = build_options(dir.path(), input);

    let err = run_build(&config, &options).await.unwrap_err();
    assert!(err.to_string().contains("no product rows"), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// validate / sizes / settings
// ---------------------------------------------------------------------------

#[test]
fn validate_writes_report_without_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = write(dir.path(), "products.csv", SOURCE);
    let report = dir.path().join("report.json");

    run_validate(&config, &input, Some(&report), None).expect("validate succeeds");

    assert!(report.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn explicit_settings_file_must_exist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let missing = dir.path().join("nope.yaml");

    let err = resolve_settings(&config, Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"), "got: {err:?}");
}

#[test]
fn default_settings_file_may_be_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let settings = resolve_settings(&config, None).expect("defaults");
    assert_eq!(settings, ProcessingSettings::default());
}

#[test]
fn sizes_accepts_multiple_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let tokens = vec!["L-2,S-4".to_string(), "M".to_string()];

    run_sizes(&config, &tokens, None).expect("sizes succeeds");
}

#[test]
fn size_lines_mark_unknown_tokens() {
    let ordering = SizeOrdering::default();
    let sizes = vec![
        SizeQuantity::new("M", Some(8)),
        SizeQuantity::new("Petite", None),
    ];

    let lines = size_lines(&ordering, &sizes, 10);
    assert_eq!(lines[0].trim_end(), "M           8");
    assert!(lines[1].starts_with("Petite      (fallback 10)"), "got: {lines:?}");
    assert!(lines[1].ends_with("(unranked)"), "got: {lines:?}");
    assert!(!lines[0].contains("unranked"));
}

#[test]
fn validate_reports_replaced_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let input = dir.path().join("latin1.csv");
    std::fs::write(&input, b"Title,Price\nCaf\xe9 tee,10\nHoodie,20\n").expect("write fixture");
    let report = dir.path().join("report.json");

    run_validate(&config, &input, Some(&report), None).expect("validate succeeds");

    let text = std::fs::read_to_string(&report).expect("report written");
    assert!(text.contains("\"parse_issue\": 1"), "report: {text}");
    assert!(text.contains("invalid UTF-8 replaced"), "report: {text}");
}
