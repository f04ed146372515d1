use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const CARD_STATEMENT: &str = "Date,Description,Amount\n\
    01/05/2024,Whole Foods Market,45.20\n\
    01/06/2024,Payment Thank You,200.00\n";

fn spendwise(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendwise").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn init(home: &Path) {
    let data_dir = home.join("data");
    spendwise(home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized spendwise"));
}

#[test]
fn test_status_before_init() {
    let home = tempfile::tempdir().unwrap();
    spendwise(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database not found"));
}

#[test]
fn test_import_then_analyze() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("card.csv");
    std::fs::write(&file, CARD_STATEMENT).unwrap();

    spendwise(home.path())
        .args(["import", file.to_str().unwrap(), "--statement-type", "credit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("card.csv: 1 added"));

    let output = spendwise(home.path()).args(["analyze", "--json"]).output().unwrap();
    assert!(output.status.success());
    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["total_expenses"], 45.2);
    assert_eq!(analysis["category_breakdown"]["food"], 45.2);
    assert_eq!(analysis["top_expenses"][0]["description"], "Whole Foods Market");

    // importing the same statement again stores nothing new
    spendwise(home.path())
        .args(["import", file.to_str().unwrap(), "--statement-type", "credit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 added, 1 skipped"));
}

#[test]
fn test_import_dry_run_stores_nothing() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let file = home.path().join("card.csv");
    std::fs::write(&file, CARD_STATEMENT).unwrap();

    spendwise(home.path())
        .args(["import", file.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    spendwise(home.path())
        .args(["transactions", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_import_reports_per_file_errors() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());
    let good = home.path().join("card.csv");
    std::fs::write(&good, CARD_STATEMENT).unwrap();
    let bad = home.path().join("statement.pdf");
    std::fs::write(&bad, "%PDF-1.4").unwrap();

    spendwise(home.path())
        .args(["import", good.to_str().unwrap(), bad.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("statement.pdf: Unsupported file format"));

    spendwise(home.path())
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: No file produced any transactions"));
}

#[test]
fn test_preview_json() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("card.csv");
    std::fs::write(&file, CARD_STATEMENT).unwrap();

    let output = spendwise(home.path())
        .args(["preview", file.to_str().unwrap(), "--rows", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let preview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(preview["columns"], serde_json::json!(["Date", "Description", "Amount"]));
    assert_eq!(preview["sample_rows"].as_array().unwrap().len(), 1);
    assert_eq!(preview["suggested_mapping"]["date"], "Date");
}

#[test]
fn test_custom_category_applies_on_import() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    spendwise(home.path())
        .args(["categories", "add", "Groceries", "--keywords", "whole foods,trader joe"])
        .assert()
        .success();
    spendwise(home.path())
        .args(["categories", "add", "groceries", "--keywords", "aldi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category already exists"));

    let file = home.path().join("card.csv");
    std::fs::write(&file, CARD_STATEMENT).unwrap();
    spendwise(home.path())
        .args(["import", file.to_str().unwrap(), "--statement-type", "credit"])
        .assert()
        .success();

    let output = spendwise(home.path())
        .args(["transactions", "list", "--json"])
        .output()
        .unwrap();
    let txns: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(txns[0]["category"], "groceries");
}

#[test]
fn test_manual_transaction_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    spendwise(home.path())
        .args(["transactions", "add", "03/07/2024", "Corner Coffee", "-4.50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(food)"));

    let output = spendwise(home.path())
        .args(["transactions", "list", "--json"])
        .output()
        .unwrap();
    let txns: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(txns[0]["date"], "2024-03-07");
    let id = txns[0]["id"].as_i64().unwrap().to_string();

    spendwise(home.path())
        .args(["transactions", "update", &id, "--category", "treats"])
        .assert()
        .success();
    spendwise(home.path())
        .args(["transactions", "delete", &id])
        .assert()
        .success();
    spendwise(home.path())
        .args(["transactions", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Transaction not found"));
}
