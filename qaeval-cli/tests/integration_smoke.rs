//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `qaeval` running in an empty directory with an empty home, so no config
/// file or .env is picked up.
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("DATABASE_URL")
        .env_remove("DB_HOST")
        .env_remove("DB_USER")
        .env_remove("DB_PASSWORD")
        .env_remove("DB_NAME")
        .env_remove("DB_PORT")
        .env_remove("DB_POOL_SIZE")
        .env_remove("JWT_SECRET")
        .env_remove("JWT_EXPIRATION_HOURS")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("import-csv"))
        .stdout(predicate::str::contains("evaluate"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// === Subcommand Help Tests ===

#[test]
fn test_import_help() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("import").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dependency order"));
}

#[test]
fn test_import_csv_requires_table() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("import-csv").arg("data.csv");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--table"));
}

#[test]
fn test_evaluate_tag_conflicts_with_pair_id() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.args(["evaluate", "--model", "GPT-4", "--tag", "sql", "--pair-id", "3"]);

    cmd.assert().failure().stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_users_create_admin_help() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("users").arg("create-admin").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Initial password"));
}

#[test]
fn test_db_help() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("db").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("foreign-keys"));
}

// === Commands That Need No Database ===

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("qaeval").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert().success().stdout(predicate::str::contains("qaeval"));
}

#[test]
fn test_config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated(&dir);
    cmd.arg("config").arg("validate");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("JWT_SECRET not set"));
}

#[test]
fn test_config_validate_rejects_zero_pool() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated(&dir);
    cmd.env("DB_POOL_SIZE", "0").arg("config").arg("validate");

    cmd.assert().failure();
}

#[test]
fn test_config_show_masks_secrets() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated(&dir);
    cmd.env("JWT_SECRET", "super-secret-value")
        .arg("config")
        .arg("show");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("db_design_pj"))
        .stdout(predicate::str::contains("super-secret-value").not());
}

#[test]
fn test_config_reads_local_toml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("qaeval.toml"),
        "[database]\nname = \"from_file\"\n",
    )
    .unwrap();
    let mut cmd = isolated(&dir);
    cmd.arg("config").arg("show").arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("from_file"));
}

#[test]
fn test_models_lists_builtin_judges() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated(&dir);
    cmd.arg("models");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GPT-4"))
        .stdout(predicate::str::contains("no"));
}

#[test]
fn test_serve_refuses_without_jwt_secret() {
    let dir = TempDir::new().unwrap();
    let mut cmd = isolated(&dir);
    cmd.arg("serve");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET"));
}

#[test]
fn test_import_bare_array_needs_table() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("tags.json");
    std::fs::write(&file, r#"[{"name": "sql"}]"#).unwrap();

    let mut cmd = isolated(&dir);
    cmd.arg("import").arg(&file);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("pass --table"));
}
