use std::{fmt, str::FromStr};

use crate::errors::{SelectionError, SelectionParseError};

use super::PStateTable;

const PERFORMANCE: &str = "performance";
const SAVE_ENERGY: &str = "save-energy";
const ID_PREFIX: &str = "id:";
const VALUE_PREFIX: &str = "val:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Performance,
    SaveEnergy,
}

// What the user asked to switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    Profile(Profile),
    // Position in the table
    ById(usize),
    // Literal pstate id, may be absent from the table
    ByValue(u8),
    // Nothing chosen yet, the user picks from the listing
    #[default]
    Interactive,
}

// Outcome of resolving a selection against a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    // The pstate id to write
    PState(u8),
    // The value isn't in the table, resolve again once the user confirmed it
    ConfirmationRequired(u8),
    // Show the table and pass the user answer to `resolve_input`
    NeedsInput,
}

impl Selection {
    // `confirmed` only matters for a ByValue selection
    // the table doesn't list
    pub fn resolve(
        &self,
        table: &PStateTable,
        confirmed: bool,
    ) -> Result<Resolution, SelectionError> {
        let pstate = match *self {
            Self::Profile(Profile::Performance) => {
                profile_pstate(table, table.perf_index())?
            }
            Self::Profile(Profile::SaveEnergy) => {
                profile_pstate(table, table.energy_index())?
            }
            Self::ById(id) => id_pstate(table, id)?,
            Self::ByValue(value) => {
                if !confirmed && !table.contains_pstate(value) {
                    return Ok(Resolution::ConfirmationRequired(value));
                }

                value
            }
            Self::Interactive => return Ok(Resolution::NeedsInput),
        };

        Ok(Resolution::PState(pstate))
    }
}

// Resolve the line typed by the user in interactive mode, a decimal id
// in `[0, table.len())`
pub fn resolve_input(table: &PStateTable, input: &str) -> Result<u8, SelectionError> {
    let input = input.trim();

    let id = parse_unsigned(input, 10)
        .ok_or_else(|| SelectionError::InvalidInput(input.to_string()))?;

    id_pstate(table, id)
}

// Only plain digits, no sign
fn parse_unsigned(digits: &str, radix: u32) -> Option<usize> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    usize::from_str_radix(digits, radix).ok()
}

fn profile_pstate(table: &PStateTable, index: Option<usize>) -> Result<u8, SelectionError> {
    index
        .and_then(|i| table.get(i))
        .map(|e| e.pstate_id)
        .ok_or(SelectionError::NoProfile)
}

fn id_pstate(table: &PStateTable, id: usize) -> Result<u8, SelectionError> {
    table
        .get(id)
        .map(|e| e.pstate_id)
        .ok_or(SelectionError::IdOutOfRange {
            id,
            len: table.len(),
        })
}

impl FromStr for Selection {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SelectionParseError(s.to_string());

        if s == PERFORMANCE {
            Ok(Self::Profile(Profile::Performance))
        } else if s == SAVE_ENERGY {
            Ok(Self::Profile(Profile::SaveEnergy))
        } else if let Some(id) = s.strip_prefix(ID_PREFIX) {
            parse_unsigned(id, 10).map(Self::ById).ok_or_else(invalid)
        } else if let Some(value) = s.strip_prefix(VALUE_PREFIX) {
            let value = value
                .strip_prefix("0x")
                .or_else(|| value.strip_prefix("0X"))
                .unwrap_or(value);

            parse_unsigned(value, 16)
                .and_then(|v| u8::try_from(v).ok())
                .map(Self::ByValue)
                .ok_or_else(invalid)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(Profile::Performance) => write!(f, "{PERFORMANCE}"),
            Self::Profile(Profile::SaveEnergy) => write!(f, "{SAVE_ENERGY}"),
            Self::ById(id) => write!(f, "{ID_PREFIX}{id}"),
            Self::ByValue(value) => write!(f, "{VALUE_PREFIX}{value:02x}"),
            Self::Interactive => write!(f, "interactive"),
        }
    }
}
