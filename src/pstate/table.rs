use tracing::{debug, trace, warn};

use crate::errors::{ParseError, TableError};

use super::{PStateRecord, line_parser::parse_line};

// A line of the report that couldn't be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    // 1-based line number in the report
    pub line: usize,
    pub error: ParseError,
}

// Every pstate reported for one device, in report order.
// The position of an entry is the id the user selects it with, so
// reserved entries are kept in place and only left out of the profile
// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PStateTable {
    device: u32,
    entries: Vec<PStateRecord>,

    perf_index: Option<usize>,
    energy_index: Option<usize>,

    skipped: Vec<SkippedLine>,
}

impl PStateTable {
    // Build the table from the content of the device `pstate` file.
    // Lines that fail to parse are skipped, the build only fails when
    // no line at all could be decoded.
    pub fn parse(blob: &str, device: u32) -> Result<Self, TableError> {
        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        for (i, line) in blob.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(record) => {
                    trace!("Device {device}: parsed {:?}", record);
                    entries.push(record);
                }
                Err(error) => {
                    warn!("Device {device}: skipping pstate line {}: {error}", i + 1);
                    skipped.push(SkippedLine { line: i + 1, error });
                }
            }
        }

        if entries.is_empty() {
            return Err(TableError::NoPStates { device });
        }

        Ok(Self::from_entries(device, entries, skipped))
    }

    fn from_entries(
        device: u32,
        entries: Vec<PStateRecord>,
        skipped: Vec<SkippedLine>,
    ) -> Self {
        let (perf_index, energy_index) = match classify(&entries) {
            Some((perf, energy)) => (Some(perf), Some(energy)),
            None => (None, None),
        };

        debug!(
            "Device {device}: {} pstates, performance: {:?}, save-energy: {:?}",
            entries.len(),
            perf_index,
            energy_index
        );

        Self {
            device,
            entries,
            perf_index,
            energy_index,
            skipped,
        }
    }

    pub fn device(&self) -> u32 {
        self.device
    }

    pub fn entries(&self) -> &[PStateRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&PStateRecord> {
        self.entries.get(id)
    }

    // Index of the entry with the highest core clock,
    // None when every entry is reserved
    pub fn perf_index(&self) -> Option<usize> {
        self.perf_index
    }

    // Index of the entry with the lowest core clock,
    // None when every entry is reserved
    pub fn energy_index(&self) -> Option<usize> {
        self.energy_index
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn contains_pstate(&self, pstate: u8) -> bool {
        self.entries.iter().any(|e| e.pstate_id == pstate)
    }
}

// Find the performance and save-energy entries in a single pass.
// Ties pick the last maximum and the first minimum.
fn classify(entries: &[PStateRecord]) -> Option<(usize, usize)> {
    let first = entries.iter().position(|e| !e.is_reserved())?;

    let mut perf = first;
    let mut energy = first;

    for (i, entry) in entries.iter().enumerate().skip(first) {
        if entry.is_reserved() {
            continue;
        }

        if entry.core_max_mhz >= entries[perf].core_max_mhz {
            perf = i;
        } else if entry.core_max_mhz < entries[energy].core_max_mhz {
            energy = i;
        }
    }

    Some((perf, energy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_STATES: &str =
        "07: core 405 MHz memory 810 MHz\n0f: core 405-1240 MHz memory 810 MHz\n";

    #[test]
    fn typical_two_state_table() {
        let table = PStateTable::parse(TWO_STATES, 0).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.perf_index(), Some(1));
        assert_eq!(table.energy_index(), Some(0));
        assert!(table.skipped().is_empty());
    }

    #[test]
    fn entries_keep_report_order() {
        let table = PStateTable::parse("0f:\n03:\n07:\n", 0).unwrap();
        let ids: Vec<u8> = table.entries().iter().map(|e| e.pstate_id).collect();

        assert_eq!(ids, vec![0x0f, 0x03, 0x07]);
    }

    #[test]
    fn reserved_entry_is_not_a_profile() {
        let table = PStateTable::parse(
            "07: core 405 MHz memory 810 MHz\nac: core 1240 MHz memory 810 MHz\n",
            0,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.perf_index(), Some(0));
        assert_eq!(table.energy_index(), Some(0));
    }

    #[test]
    fn leading_reserved_entry_is_not_a_profile() {
        let table = PStateTable::parse(
            "ac: core 1240 MHz\n07: core 405 MHz\n0a: core 810 MHz\n",
            0,
        )
        .unwrap();

        assert_eq!(table.perf_index(), Some(2));
        assert_eq!(table.energy_index(), Some(1));
    }

    #[test]
    fn only_reserved_entries_have_no_profile() {
        let table = PStateTable::parse("ac: core 1240 MHz\n", 0).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.perf_index(), None);
        assert_eq!(table.energy_index(), None);
    }

    #[test]
    fn ties_pick_last_max_and_first_min() {
        let table = PStateTable::parse(
            "01: core 405 MHz\n02: core 1240 MHz\n03: core 405 MHz\n04: core 1240 MHz\n",
            0,
        )
        .unwrap();

        assert_eq!(table.perf_index(), Some(3));
        assert_eq!(table.energy_index(), Some(0));
    }

    #[test]
    fn malformed_line_is_skipped() {
        let table = PStateTable::parse(
            "07: core 405 MHz memory 810 MHz\ngarbage line\n0f: core 1240 MHz memory 810 MHz\n",
            3,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.device(), 3);
        assert_eq!(
            table.skipped(),
            &[SkippedLine {
                line: 2,
                error: ParseError::InvalidId("garbage".to_string()),
            }]
        );
    }

    #[test]
    fn cloned_table_keeps_skipped_lines() {
        let table = PStateTable::parse("07: core 405 MHz\n07: core 405 mhz\n", 0).unwrap();
        let copy = table.clone();

        assert_eq!(copy, table);
        assert_eq!(
            copy.skipped()[0].error,
            ParseError::UnknownUnit("mhz".to_string())
        );
    }

    #[test]
    fn empty_report_fails() {
        assert_eq!(
            PStateTable::parse("", 2),
            Err(TableError::NoPStates { device: 2 })
        );
        assert_eq!(
            PStateTable::parse("\n\n", 0),
            Err(TableError::NoPStates { device: 0 })
        );
        assert_eq!(
            PStateTable::parse("nothing useful\n07: core\n", 1),
            Err(TableError::NoPStates { device: 1 })
        );
    }

    #[test]
    fn contains_pstate() {
        let table = PStateTable::parse(TWO_STATES, 0).unwrap();

        assert!(table.contains_pstate(0x0f));
        assert!(!table.contains_pstate(0x55));
    }
}
