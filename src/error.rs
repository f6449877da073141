use std::{io, path::PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("line is not terminated by a newline")]
    MissingNewline,
    #[error("no ';' between station name and temperature")]
    MissingDelimiter,
    #[error("empty station name")]
    EmptyName,
    #[error("station name is {len} bytes, limit is {max}")]
    NameTooLong { len: usize, max: usize },
    #[error("temperature does not match -?d{{1,2}}.d")]
    BadTemperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line {line} (byte offset {offset}): {kind}")]
pub struct MalformedInput {
    /// 1-based.
    pub line: u64,
    /// Offset of the first byte of the line.
    pub offset: usize,
    pub kind: MalformedKind,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Usage: {program} <measurements.txt>")]
    Usage { program: String },
    #[error("cannot open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot map {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed input: {0}")]
    Malformed(#[from] MalformedInput),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
