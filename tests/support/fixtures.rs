//! Test fixtures and constants.

use vault2vault::core::cipher::{AnsibleVault, VaultCipher};
use vault2vault::core::document::Document;
use vault2vault::core::keys::VaultKey;

/// Password the fixtures are encrypted with.
pub const OLD_PASSWORD: &str = "old";

/// Password everything should be rekeyed to.
pub const NEW_PASSWORD: &str = "new";

/// A password neither side of the rekey knows.
pub const FOREIGN_PASSWORD: &str = "someone-else";

/// Encrypt `plaintext` as a vault envelope.
pub fn vault(plaintext: &str, password: &str, vault_id: Option<&str>) -> String {
    AnsibleVault
        .encrypt(plaintext.as_bytes(), &VaultKey::new(password), vault_id)
        .expect("failed to encrypt fixture")
}

/// Decrypt an envelope, `None` if the password is wrong.
pub fn open(envelope: &str, password: &str) -> Option<String> {
    AnsibleVault
        .decrypt(envelope, &VaultKey::new(password))
        .ok()
        .map(|p| String::from_utf8_lossy(&p).to_string())
}

/// A `name: !vault |` mapping entry holding `envelope`.
pub fn inline(name: &str, envelope: &str) -> String {
    let mut out = format!("{}: !vault |\n", name);
    for line in envelope.lines() {
        out.push_str("          ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// String value at a displayed location such as `db.password`.
pub fn value_at(yaml: &str, location: &str) -> String {
    let doc = Document::parse(yaml.as_bytes()).expect("not a YAML document");
    doc.walk()
        .find(|(l, _)| l.to_string() == location)
        .and_then(|(_, scalar)| scalar.as_str().map(String::from))
        .unwrap_or_else(|| panic!("no string value at {}", location))
}

/// Vars file with a plain value, a nested vaulted value and a list item.
pub fn sample_vars() -> String {
    let mut nested = String::new();
    for line in vault("db-secret", OLD_PASSWORD, None).lines() {
        nested.push_str("      ");
        nested.push_str(line);
        nested.push('\n');
    }
    format!(
        "# application settings\napp_name: demo\ndb:\n  host: localhost\n  password: !vault |\n{}users:\n  - name: alice\n    port: 5432\n",
        nested
    )
}
