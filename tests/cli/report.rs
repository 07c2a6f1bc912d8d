//! Tests for the human and JSON reports.

use crate::support::*;

fn mixed_tree(t: &Test) {
    t.write("a.vault", vault("a", OLD_PASSWORD, None));
    t.write("b.vault", vault("b", FOREIGN_PASSWORD, None));
    t.write("plain.yml", "a: 1\n");
}

#[test]
fn test_summary_section() {
    let t = Test::new();
    mixed_tree(&t);

    let output = t.rekey_all();
    assert_failure(&output);

    let out = stdout(&output);
    assert!(out.contains("✓ rekeyed ./a.vault (1 value)"), "got: {}", out);
    assert!(out.contains("Summary"));
    assert!(out.contains("rekeyed:"));
    assert!(out.contains("failed:"));
    assert_stderr_contains(&output, "✗ failed ./b.vault");
}

#[test]
fn test_unchanged_hidden_unless_verbose() {
    let t = Test::new();
    t.write("plain.yml", "a: 1\n");

    let output = t.rekey_all();
    assert_success(&output);
    assert_stdout_excludes(&output, "unchanged ./plain.yml");

    let output = t.rekey(&["--verbose", "."]);
    assert_success(&output);
    assert_stdout_contains(&output, "unchanged ./plain.yml");
}

#[test]
fn test_json_report() {
    let t = Test::new();
    mixed_tree(&t);

    let output = t.rekey(&["--json", "."]);
    assert_failure(&output);

    let report = stdout_json(&output);
    assert_eq!(report["rekeyed"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["unchanged"], 1);
    assert_eq!(report["values"], 1);

    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    let failed = files.iter().find(|f| f["outcome"] == "failed").unwrap();
    assert!(failed["path"].as_str().unwrap().ends_with("b.vault"));
    assert!(failed["error"].as_str().unwrap().contains("unable to decrypt"));
}

#[test]
fn test_json_skip_reasons() {
    let t = Test::new();
    t.write(
        "vars.yml",
        format!(
            "{}{}",
            inline("ours", &vault("o", OLD_PASSWORD, None)),
            inline("theirs", &vault("t", OLD_PASSWORD, Some("other"))),
        ),
    );

    let output = t.rekey(&["--json", "--vault-id", "default", "."]);
    assert_success(&output);

    let report = stdout_json(&output);
    let note = &report["files"][0]["notes"][0];
    assert_eq!(note["location"], "theirs");
    assert_eq!(note["skipped"]["reason"], "vault_id_mismatch");
    assert_eq!(note["skipped"]["found"], "other");
}

#[test]
fn test_json_has_no_human_lines() {
    let t = Test::new();
    t.write("a.vault", vault("a", OLD_PASSWORD, None));

    let output = t.rekey(&["--json", "."]);
    assert_success(&output);
    assert_stdout_excludes(&output, "Summary");
    assert_stdout_excludes(&output, "✓");
}

#[test]
fn test_ignored_value_named_without_verbose() {
    let t = Test::new();
    t.write(
        "vars.yml",
        format!("plain: 1\n{}", inline("theirs", &vault("t", FOREIGN_PASSWORD, None))),
    );

    let output = t.rekey(&["--ignore-undecryptable", "."]);
    assert_success(&output);

    assert_stdout_contains(&output, "./vars.yml: theirs: skipped, undecryptable");
    assert_stderr_contains(&output, "location=theirs");
    assert_stderr_contains(&output, "vars.yml");
}

#[test]
fn test_filtered_value_quiet_without_verbose() {
    let t = Test::new();
    t.write("vars.yml", inline("prod", &vault("p", OLD_PASSWORD, Some("prod"))));

    let output = t.rekey(&["--vault-id", "dev", "."]);
    assert_success(&output);
    assert_stdout_excludes(&output, "prod: skipped");

    let output = t.rekey(&["--vault-id", "dev", "--verbose", "."]);
    assert_success(&output);
    assert_stdout_contains(&output, "prod: skipped, vault-id 'prod' does not match");
}
