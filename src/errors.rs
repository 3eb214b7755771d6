use std::{io, path::PathBuf};

use thiserror::Error;

// Failure to decode a single line of the pstate report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a hexadecimal pstate id, found \"{0}\"")]
    InvalidId(String),
    #[error("expected a clock after \"{0}\"")]
    MissingClock(String),
    #[error("malformed clock token \"{0}\"")]
    InvalidClock(String),
    #[error("expected a clock unit after \"{0}\"")]
    MissingUnit(String),
    #[error("unknown clock unit \"{0}\"")]
    UnknownUnit(String),
    #[error("clock value \"{0}\" does not fit in megahertz")]
    ClockOverflow(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no pstates available for device {device}")]
    NoPStates { device: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("pstate id {id} is out of range, the table has {len} entries")]
    IdOutOfRange { id: usize, len: usize },
    #[error("the table has no usable pstate to pick a profile from")]
    NoProfile,
    #[error("invalid input: \"{0}\"")]
    InvalidInput(String),
    #[error("unknown pstate {0:02x} was not confirmed")]
    NotConfirmed(u8),
}

// Raised when the value given to `-p` can't be understood
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "unknown pstate selection \"{0}\", expected performance | save-energy | id:<id> | val:<value>"
)]
pub struct SelectionParseError(pub String);

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("can not read \"{}\"", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("can not write \"{}\"", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// The main library error type
#[derive(Debug, Error)]
pub enum NoupstateError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}
