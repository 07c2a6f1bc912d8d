//! vault2vault - Rekey Ansible vault files and inline vaulted values in bulk.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── mod           # Flags, settings resolution, execute
//! │   ├── keys          # Password file, env and prompt sources
//! │   ├── confirm       # Interactive confirmation
//! │   └── output        # Human and JSON reports
//! └── core/             # Core library components
//!     ├── cipher/       # Vault cipher trait and AES256 implementation
//!     ├── envelope      # Vault header detection
//!     ├── document/     # YAML node tree, walker and rendering
//!     ├── rekey         # One envelope in, one envelope out
//!     ├── processor     # One file in, one report out
//!     ├── tree          # Directory traversal and summary
//!     ├── fs            # Atomic writes and backups
//!     ├── config        # .vault2vault.toml management
//!     └── keys          # Vault passwords
//! ```
//!
//! # Features
//!
//! - Whole-file vaults and `!vault` values inside YAML documents
//! - Vault-id labels preserved, optionally used as a filter
//! - Edits spliced into the original text so comments and layout survive
//! - Atomic writes with optional backups
//! - Interactive confirmation and parallel processing

pub mod cli;
pub mod core;
pub mod error;
