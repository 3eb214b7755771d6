use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::{
    device::PStateDevice,
    errors::SelectionError,
    pstate::{PStateTable, Resolution, Selection, selector::resolve_input},
};

// Print the pstate table of the device
pub fn list<D: PStateDevice, W: Write>(device: &D, json: bool, out: &mut W) -> Result<()> {
    let table = read_table(device)?;

    if json {
        let listing = table
            .to_json()
            .with_context(|| "Failed to serialize the pstate table")?;
        writeln!(out, "{listing}")?;
    } else {
        write!(out, "{table}")?;
    }

    Ok(())
}

// Resolve the selection and write it to the device.
// `input` is only read when the user has to pick an id or confirm
// an unknown value, prompts are written to `out`.
pub fn set<D: PStateDevice, R: BufRead, W: Write>(
    device: &D,
    selection: Selection,
    assume_yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<u8> {
    let table = read_table(device)?;

    let pstate = match selection.resolve(&table, assume_yes)? {
        Resolution::PState(pstate) => pstate,
        Resolution::ConfirmationRequired(value) => {
            confirm_unknown(&table, selection, value, input, out)?
        }
        Resolution::NeedsInput => prompt_id(&table, input, out)?,
    };

    device
        .write_pstate(pstate)
        .with_context(|| format!("Failed to change pstate to {pstate:02x}"))?;

    info!("pstate successfully changed to {pstate:02x}.");

    Ok(pstate)
}

fn read_table<D: PStateDevice>(device: &D) -> Result<PStateTable> {
    device
        .read_table()
        .with_context(|| format!("Failed to load pstates for device {}", device.index()))
}

// Ask before writing a value the device doesn't list
fn confirm_unknown<R: BufRead, W: Write>(
    table: &PStateTable,
    selection: Selection,
    value: u8,
    input: &mut R,
    out: &mut W,
) -> Result<u8> {
    debug!("Asking to confirm unknown pstate {value:02x}");

    write!(out, "Unknown pstate '{value:02x}'. Continue? [y/N] ")?;
    out.flush()?;

    let answer = read_answer(input)?;
    if !matches!(answer.trim_start().chars().next(), Some('y' | 'Y')) {
        return Err(SelectionError::NotConfirmed(value).into());
    }

    match selection.resolve(table, true)? {
        Resolution::PState(pstate) => Ok(pstate),
        other => Err(anyhow!("Confirmed selection {selection} resolved to {other:?}")),
    }
}

// Show the table and let the user pick an entry by id
fn prompt_id<R: BufRead, W: Write>(
    table: &PStateTable,
    input: &mut R,
    out: &mut W,
) -> Result<u8> {
    write!(out, "{table}")?;
    write!(out, "Type [0-{}].\n> ", table.len().saturating_sub(1))?;
    out.flush()?;

    let answer = read_answer(input)?;

    Ok(resolve_input(table, &answer)?)
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .with_context(|| "Failed to read user input")?;

    Ok(answer)
}
