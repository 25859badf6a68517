//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate port pairing and directory layout
//! - Validate MIME overrides
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Rule patterns are validated when compiled, not here
//! - Port 0 is accepted and means "any free port"

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("asset_port and notify_port are both {0}")]
    PortConflict(u16),

    #[error("root_dir {} does not exist or is not a directory", .0.display())]
    RootDirMissing(PathBuf),

    #[error("base_dir `{0}` must be relative to root_dir")]
    AbsoluteBaseDir(String),

    #[error("mime override for `{0}` has an empty type")]
    EmptyMimeType(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.asset_port != 0 && config.asset_port == config.notify_port {
        errors.push(ValidationError::PortConflict(config.asset_port));
    }

    if !config.root_dir.is_dir() {
        errors.push(ValidationError::RootDirMissing(config.root_dir.clone()));
    }

    if Path::new(&config.base_dir).is_absolute() {
        errors.push(ValidationError::AbsoluteBaseDir(config.base_dir.clone()));
    }

    let mut empty_types: Vec<_> = config
        .mime_overrides
        .iter()
        .filter(|(_, mime)| mime.trim().is_empty())
        .map(|(ext, _)| ValidationError::EmptyMimeType(ext.clone()))
        .collect();
    empty_types.sort_by_key(|e| e.to_string());
    errors.extend(empty_types);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
