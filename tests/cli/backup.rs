//! Tests for backup copies.

use crate::support::*;

fn backups(t: &Test, name: &str) -> Vec<String> {
    let mut found: Vec<String> = std::fs::read_dir(t.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with(name) && n != name)
        .collect();
    found.sort();
    found
}

#[test]
fn test_backup_holds_original_bytes() {
    let t = Test::new();
    let original = vault("a", OLD_PASSWORD, None);
    t.write("a.vault", &original);

    let output = t.rekey(&["--backup", "."]);
    assert_success(&output);
    assert_stdout_contains(&output, "backup:");

    assert_eq!(t.read("a.vault.bak"), original);
    assert_eq!(open(&t.read("a.vault"), NEW_PASSWORD).as_deref(), Some("a"));
}

#[test]
fn test_no_backup_by_default() {
    let t = Test::new();
    t.write("a.vault", vault("a", OLD_PASSWORD, None));

    assert_success(&t.rekey_all());
    assert!(backups(&t, "a.vault").is_empty());
}

#[test]
fn test_no_backup_for_unchanged_file() {
    let t = Test::new();
    t.write("plain.yml", "a: 1\n");

    assert_success(&t.rekey(&["-b", "."]));
    assert!(backups(&t, "plain.yml").is_empty());
}

#[test]
fn test_custom_suffix() {
    let t = Test::new();
    let original = vault("a", OLD_PASSWORD, None);
    t.write("a.vault", &original);

    assert_success(&t.rekey(&["-b", "--backup-suffix", ".orig", "."]));
    assert_eq!(t.read("a.vault.orig"), original);
}

#[test]
fn test_backups_reported_not_rekeyed() {
    let t = Test::new();
    let stale = vault("stale", OLD_PASSWORD, None);
    t.write("a.vault", vault("a", OLD_PASSWORD, None));
    t.write("a.vault.bak", &stale);
    t.write("a.vault.bak.20240101_120000", &stale);

    let output = t.rekey(&["--json", "-b", "."]);
    assert_success(&output);

    let report = stdout_json(&output);
    assert_eq!(report["rekeyed"], 1);
    assert_eq!(report["skipped"], 2);
    for file in report["files"].as_array().unwrap() {
        if file["outcome"] == "skipped" {
            assert_eq!(file["reason"], "backup file");
        }
    }
    assert_eq!(t.read("a.vault.bak.20240101_120000"), stale);
}

#[test]
fn test_backup_named_file_rekeyed_without_backup_flag() {
    let t = Test::new();
    t.write("secret.bak", vault("real", OLD_PASSWORD, None));

    let output = t.rekey_all();
    assert_success(&output);
    assert_stdout_contains(&output, "rekeyed ./secret.bak");
    assert_eq!(open(&t.read("secret.bak"), NEW_PASSWORD).as_deref(), Some("real"));
}

#[test]
fn test_overwrite_collision_replaces_backup() {
    let t = Test::new();
    let original = vault("a", OLD_PASSWORD, None);
    t.write("a.vault", &original);
    t.write("a.vault.bak", "stale");

    assert_success(&t.rekey(&["-b", "."]));
    assert_eq!(t.read("a.vault.bak"), original);
    assert_eq!(backups(&t, "a.vault"), vec!["a.vault.bak"]);
}

#[test]
fn test_timestamped_collision_keeps_earlier_backup() {
    let t = Test::new();
    let original = vault("a", OLD_PASSWORD, None);
    t.write("a.vault", &original);
    t.write("a.vault.bak", "stale");

    let output = t.rekey(&["-b", "--backup-collision", "timestamped", "."]);
    assert_success(&output);

    assert_eq!(t.read("a.vault.bak"), "stale");
    let found = backups(&t, "a.vault");
    assert_eq!(found.len(), 2);
    let stamped = found.iter().find(|n| *n != "a.vault.bak").unwrap();
    assert_eq!(t.read(stamped), original);
}

#[cfg(unix)]
#[test]
fn test_backup_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::new();
    let path = t.write("a.vault", vault("a", OLD_PASSWORD, None));
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

    assert_success(&t.rekey(&["-b", "."]));

    for name in ["a.vault", "a.vault.bak"] {
        let mode = std::fs::metadata(t.path(name)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "{} permissions changed", name);
    }
}
