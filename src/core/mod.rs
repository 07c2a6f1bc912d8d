//! Core library components.
//!
//! This module contains the rekey engine: envelope detection, the vault
//! cipher, document traversal, and the file and tree drivers.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod document;
pub mod envelope;
pub mod fs;
pub mod keys;
pub mod processor;
pub mod rekey;
pub mod tree;
