//! Tests for the configuration file.

use crate::support::*;

#[test]
fn test_local_config_enables_backup() {
    let t = Test::new();
    t.write(".vault2vault.toml", "[backup]\nenabled = true\nsuffix = \".pre-rekey\"\n");
    let original = vault("a", OLD_PASSWORD, None);
    t.write("secrets/a.vault", &original);

    assert_success(&t.rekey(&["secrets"]));
    assert_eq!(t.read("secrets/a.vault.pre-rekey"), original);
}

#[test]
fn test_explicit_config() {
    let t = Test::new();
    let config = t.home.path().join("custom.toml");
    std::fs::write(&config, "[walk]\nskip_dirs = [\"vendor\"]\n").unwrap();
    let vendored = vault("v", OLD_PASSWORD, None);
    t.write("vendor/lib.vault", &vendored);
    t.write("own.vault", vault("o", OLD_PASSWORD, None));

    let output = t
        .rekey_cmd()
        .arg("--config")
        .arg(&config)
        .arg(".")
        .output()
        .unwrap();
    assert_success(&output);

    assert_eq!(t.read("vendor/lib.vault"), vendored);
    assert!(open(&t.read("own.vault"), NEW_PASSWORD).is_some());
}

#[cfg(target_os = "linux")]
#[test]
fn test_global_config() {
    let t = Test::new();
    let dir = t.home.path().join(".config").join("vault2vault");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[backup]\nenabled = true\n").unwrap();
    t.write("a.vault", vault("a", OLD_PASSWORD, None));

    assert_success(&t.rekey_all());
    assert!(t.path("a.vault.bak").exists());
}

#[test]
fn test_config_ignore_undecryptable() {
    let t = Test::new();
    t.write(".vault2vault.toml", "[run]\nignore_undecryptable = true\n");
    t.write("theirs.vault", vault("t", FOREIGN_PASSWORD, None));

    let output = t.rekey_all();
    assert_success(&output);
}

#[test]
fn test_missing_explicit_config() {
    let t = Test::new();
    let output = t.rekey(&["--config", "nope.toml", "."]);
    assert_failure(&output);
    assert_stderr_contains(&output, "config file not found");
}

#[test]
fn test_invalid_config() {
    let t = Test::new();
    t.write(".vault2vault.toml", "[run]\njobs = 0\n");

    let output = t.rekey_all();
    assert_failure(&output);
    assert_stderr_contains(&output, "run.jobs");
    assert_stdout_contains(&output, "check .vault2vault.toml");
}

#[test]
fn test_cli_overrides_config() {
    let t = Test::new();
    t.write(".vault2vault.toml", "[backup]\nenabled = true\nsuffix = \".one\"\n");
    t.write("a.vault", vault("a", OLD_PASSWORD, None));

    assert_success(&t.rekey(&["--backup-suffix", ".two", "."]));
    assert!(t.path("a.vault.two").exists());
    assert!(!t.path("a.vault.one").exists());
}
