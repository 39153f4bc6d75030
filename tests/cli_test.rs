use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn offline_book() -> Command {
    let mut cmd = Command::new(cargo_bin!("petcare-booking"));
    cmd.env_remove("PETCARE_CONFIG")
        .env("RUST_LOG", "warn")
        .args(["book", "--offline", "--visit-type", "vt-grooming"]);
    cmd
}

#[test]
fn test_cli_free_visit_is_saved() {
    let mut cmd = offline_book();
    cmd.args(["--pet-id", "pet-1", "--price", "500", "--discount", "500"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total amount: ₹0"))
        .stdout(predicate::str::contains("Visit saved successfully"));
}

#[test]
fn test_cli_full_payment() {
    let mut cmd = offline_book();
    cmd.args([
        "--pet-id", "pet-1", "--price", "800", "--discount", "300", "--payment", "full",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total amount: ₹500"))
        .stdout(predicate::str::contains("You save: ₹300"))
        .stdout(predicate::str::contains("Payment successful and visit saved!"));
}

#[test]
fn test_cli_partial_payment_must_add_up() {
    let mut cmd = offline_book();
    cmd.args([
        "--pet-id", "pet-1", "--price", "800", "--payment", "partial", "--advance", "300",
        "--remaining", "300",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must add up to ₹800"));
}

#[test]
fn test_cli_subscription_session() {
    let mut cmd = offline_book();
    cmd.args([
        "--pet-id",
        "pet-1",
        "--price",
        "800",
        "--use-subscription",
        "--offline-sessions",
        "3",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Active subscription for pet-1: Number of Groomings left: 3",
        ))
        .stdout(predicate::str::contains("Total amount: ₹0"))
        .stdout(predicate::str::contains("Visit saved successfully"));
}

#[test]
fn test_cli_reports_missing_subscription() {
    let mut cmd = offline_book();
    cmd.args(["--pet-id", "pet-1", "--price", "500", "--payment", "after"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No active subscription for Grooming"))
        .stdout(predicate::str::contains("Visit saved successfully"));
}

#[test]
fn test_cli_missing_pet_is_rejected() {
    let mut cmd = offline_book();
    cmd.args(["--pet-id", " ", "--price", "500"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("A pet must be selected"));
}

#[test]
fn test_cli_payment_choice_required() {
    let mut cmd = offline_book();
    cmd.args(["--pet-id", "pet-1", "--price", "500"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("choose --payment"));
}

#[test]
fn test_cli_slides_from_config() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[carousel]").unwrap();
    writeln!(config, "interval_ms = 10").unwrap();
    writeln!(config, "slides = [").unwrap();
    writeln!(config, "  {{ image = \"/images/a.png\", alt = \"A\" }},").unwrap();
    writeln!(config, "  {{ image = \"/images/b.png\", alt = \"B\" }},").unwrap();
    writeln!(config, "]").unwrap();

    let mut cmd = Command::new(cargo_bin!("petcare-booking"));
    cmd.arg("--config")
        .arg(config.path())
        .args(["slides", "--ticks", "2"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[0] /images/a.png (A)"))
        .stdout(predicate::str::contains("[1] /images/b.png (B)"));
}
