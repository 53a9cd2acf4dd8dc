use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason the master gave for rejecting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainErrorKind {
    FileDoesNotExist,
    FileAlreadyExists,
    InvalidPath,
    /// Block metadata is missing or corrupted.
    BlockInfo,
    SuspectedFileSize,
    TableColumn,
    TableDoesNotExist,
    DependencyDoesNotExist,
    NoWorker,
    /// Generic master-side failure.
    Master,
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FileDoesNotExist => "file does not exist",
            Self::FileAlreadyExists => "file already exists",
            Self::InvalidPath => "invalid path",
            Self::BlockInfo => "corrupted block info",
            Self::SuspectedFileSize => "suspected file size",
            Self::TableColumn => "invalid table column",
            Self::TableDoesNotExist => "table does not exist",
            Self::DependencyDoesNotExist => "dependency does not exist",
            Self::NoWorker => "no worker",
            Self::Master => "master error",
        };
        f.write_str(s)
    }
}

/// A well-formed rejection from the master.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct DomainError {
    pub kind: DomainErrorKind,
    #[serde(default)]
    pub message: String,
}

impl DomainError {
    pub fn new(kind: DomainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
