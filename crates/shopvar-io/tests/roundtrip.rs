//! File-level ingest → expansion → export tests.

use std::io::Write;

use shopvar_core::{IssueKind, IssueReport, ProcessingSettings, ValidationIssue};
use shopvar_io::{read_source_file, write_report, write_shopify_file, SHOPIFY_COLUMNS};
use shopvar_variants::generate_variants;

fn write_input(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    write_bytes(dir, name, contents.as_bytes())
}

fn write_bytes(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create input");
    file.write_all(contents).expect("write input");
    path
}

fn export(dir: &tempfile::TempDir, rows: &[shopvar_core::SourceRow]) -> Vec<csv::StringRecord> {
    let settings = ProcessingSettings::default();
    let generation = generate_variants(rows, &settings);
    let output = dir.path().join("out").join("shopify.csv");
    write_shopify_file(&output, &generation.variants, &settings).expect("write export");
    csv::Reader::from_path(&output)
        .expect("open export")
        .records()
        .collect::<Result<_, _>>()
        .expect("records")
}

#[test]
fn csv_file_expands_into_shopify_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(
        &dir,
        "products.csv",
        "Title,Description,Colour,Size,Product Code,Price,Status\n\
         Cotton T-Shirt,Soft tee,\"Red,Blue,Black\",\"S-10,M-15,L-12\",TS001,299,active\n\
         Broken,No price here,,,BR001,,draft\n",
    );

    let ingest = read_source_file(&input).expect("read input");
    assert!(ingest.issues.is_empty());
    let rows = ingest.rows;
    assert_eq!(rows.len(), 2);

    let settings = ProcessingSettings::default();
    let generation = generate_variants(&rows, &settings);
    assert_eq!(generation.variants.len(), 9);
    assert_eq!(generation.excluded_rows, vec![1]);

    let output = dir.path().join("out").join("shopify.csv");
    let written =
        write_shopify_file(&output, &generation.variants, &settings).expect("write export");
    assert_eq!(written, 9);

    let mut reader = csv::Reader::from_path(&output).expect("open export");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.len(), SHOPIFY_COLUMNS.len());

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(records.len(), 9);

    let total_qty: i64 = records
        .iter()
        .map(|r| r[20].parse::<i64>().expect("qty is numeric"))
        .sum();
    assert_eq!(total_qty, 111);

    assert_eq!(&records[0][0], "cotton-t-shirt-ts001");
    assert_eq!(&records[0][1], "Cotton T-Shirt");
    assert_eq!(&records[0][7], "TRUE");
    assert_eq!(&records[0][23], "299.00");
    assert!(records[1..].iter().all(|r| r[1].is_empty()));
}

#[test]
fn non_latin_and_repeated_titles_stay_separate_products() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_input(
        &dir,
        "products.csv",
        "Title,Price,Size\n\
         قمیص,10,\"S,M\"\n\
         کرتا,20,\"S,M\"\n\
         Hoodie,30,S\n\
         Hoodie,30,S\n",
    );
    let rows = read_source_file(&input).expect("read input").rows;
    let records = export(&dir, &rows);
    assert_eq!(records.len(), 6);

    let products: Vec<(&str, &str)> = records
        .iter()
        .filter(|r| !r[1].is_empty())
        .map(|r| (&r[0], &r[1]))
        .collect();
    assert_eq!(
        products,
        vec![
            ("قمیص", "قمیص"),
            ("کرتا", "کرتا"),
            ("hoodie", "Hoodie"),
            ("hoodie-2", "Hoodie"),
        ]
    );
}

#[test]
fn non_utf8_file_is_read_with_replacement() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_bytes(
        &dir,
        "latin1.csv",
        b"Title,Price,Size\nGood,10,S\nBad \xe9,20,M\nAlso good,30,L\n",
    );

    let ingest = read_source_file(&input).expect("lossy read succeeds");
    assert_eq!(ingest.rows.len(), 3);
    assert_eq!(ingest.issues.len(), 1);
    assert_eq!(ingest.issues[0].kind, IssueKind::ParseIssue);

    let records = export(&dir, &ingest.rows);
    let titles: Vec<&str> = records.iter().map(|r| &r[1]).collect();
    assert_eq!(titles, vec!["Good", "Bad \u{FFFD}", "Also good"]);
}

#[test]
fn report_is_written_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.json");

    let mut report = IssueReport::new();
    report.push(ValidationIssue::row(1, IssueKind::RowExcluded, "missing price"));
    write_report(&path, &report).expect("write report");

    let text = std::fs::read_to_string(&path).expect("read report");
    let json: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(json["summary"]["row_excluded"], 1);
    assert_eq!(json["issues"][0]["message"], "missing price");
}
