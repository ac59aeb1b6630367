//! Error types shared across the engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::shapes::ShapeId;

/// Shared store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CRDT error: {0}")]
    Loro(#[from] loro::LoroError),
    #[error("Record shapeId {found} does not match store key {key}")]
    IdMismatch { key: ShapeId, found: ShapeId },
    #[error("Record for key {0} has no shapeId")]
    MissingId(ShapeId),
    #[error("Document is checked out at a past version and cannot be edited")]
    Detached,
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Image asset errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image {0} has no pixels")]
    Empty(String),
}

/// Errors surfaced by discrete commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;
