//! Tests for the vault-id filter.

use crate::support::*;

fn labelled(t: &Test) {
    t.write(
        "vars.yml",
        format!(
            "{}{}{}",
            inline("untagged", &vault("u", OLD_PASSWORD, None)),
            inline("prod", &vault("p", OLD_PASSWORD, Some("prod"))),
            inline("dev", &vault("d", OLD_PASSWORD, Some("dev"))),
        ),
    );
}

fn rekeyed(t: &Test, key: &str) -> bool {
    open(&value_at(&t.read("vars.yml"), key), NEW_PASSWORD).is_some()
}

#[test]
fn test_filter_by_label() {
    let t = Test::new();
    labelled(&t);

    let output = t.rekey(&["--vault-id", "prod", "."]);
    assert_success(&output);

    assert!(rekeyed(&t, "prod"));
    assert!(!rekeyed(&t, "untagged"));
    assert!(!rekeyed(&t, "dev"));
}

#[test]
fn test_default_filter_matches_untagged() {
    let t = Test::new();
    labelled(&t);

    assert_success(&t.rekey(&["--vault-id", "default", "."]));

    assert!(rekeyed(&t, "untagged"));
    assert!(!rekeyed(&t, "prod"));
    assert!(!rekeyed(&t, "dev"));
}

#[test]
fn test_no_filter_rekeys_everything() {
    let t = Test::new();
    labelled(&t);

    assert_success(&t.rekey_all());

    for key in ["untagged", "prod", "dev"] {
        assert!(rekeyed(&t, key), "{} not rekeyed", key);
    }
}

#[test]
fn test_filtered_vault_file_unchanged() {
    let t = Test::new();
    let dev = vault("d", OLD_PASSWORD, Some("dev"));
    t.write("dev.vault", &dev);

    let output = t.rekey(&["--vault-id", "prod", "--verbose", "."]);
    assert_success(&output);
    assert_stdout_contains(&output, "unchanged");
    assert_eq!(t.read("dev.vault"), dev);
}
