//! Constants used throughout vault2vault.
//!
//! Centralizes magic strings and configuration values.

/// Marker every vault envelope starts with.
pub const VAULT_MARKER: &str = "$ANSIBLE_VAULT";

/// Field separator inside the envelope header line.
pub const HEADER_SEPARATOR: char = ';';

/// Envelope version written for untagged payloads.
pub const VERSION_UNTAGGED: &str = "1.1";

/// Envelope version written when a vault-id label is attached.
pub const VERSION_TAGGED: &str = "1.2";

/// The only cipher identifier supported.
pub const CIPHER_AES256: &str = "AES256";

/// Vault-id reported for envelopes that carry no label.
pub const DEFAULT_VAULT_ID: &str = "default";

/// Maximum number of bytes inspected when detecting an envelope header.
pub const MAX_HEADER_LEN: usize = 256;

/// Column width of the hex body lines.
pub const BODY_WIDTH: usize = 80;

/// Project configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".vault2vault.toml";

/// Directory under the user config dir holding the global config.
pub const CONFIG_DIR: &str = "vault2vault";

/// Global configuration file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Default suffix appended to backup copies.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Timestamp format for backups kept alongside earlier ones.
pub const BACKUP_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Directory names never descended into.
pub const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "VAULT2VAULT_LOG";
