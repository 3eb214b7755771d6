use std::fmt;

use serde::Serialize;

use super::{PStateRecord, PStateTable};

// Annotation shown next to an entry of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryProfile {
    Performance,
    SaveEnergy,
    Reserved,
}

impl EntryProfile {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Performance => " (performance profile)",
            Self::SaveEnergy => " (save-energy profile)",
            Self::Reserved => " (DON'T USE!)",
        }
    }
}

impl PStateTable {
    // At most one annotation per entry, performance first
    pub fn profile_of(&self, id: usize) -> Option<EntryProfile> {
        if self.perf_index() == Some(id) {
            Some(EntryProfile::Performance)
        } else if self.energy_index() == Some(id) {
            Some(EntryProfile::SaveEnergy)
        } else if self.get(id).is_some_and(PStateRecord::is_reserved) {
            Some(EntryProfile::Reserved)
        } else {
            None
        }
    }

    // Serialize the table for `list --json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        let pstates = self
            .entries()
            .iter()
            .enumerate()
            .map(|(id, record)| JsonEntry {
                id,
                pstate: format!("{:02x}", record.pstate_id),
                core_min_mhz: record.core_min_mhz,
                core_max_mhz: record.core_max_mhz,
                mem_mhz: record.mem_mhz,
                profile: self.profile_of(id),
            })
            .collect();

        serde_json::to_string_pretty(&JsonTable {
            device: self.device(),
            pstates,
        })
    }
}

// One line per entry:
// [id:1] val:0f, core-clock 405-1240 MHz, memory-clock 810 MHz (performance profile)
impl fmt::Display for PStateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, record) in self.entries().iter().enumerate() {
            let suffix = self.profile_of(id).map_or("", |p| p.suffix());

            writeln!(
                f,
                "[id:{id}] val:{:02x}, core-clock {}-{} MHz, memory-clock {} MHz{suffix}",
                record.pstate_id, record.core_min_mhz, record.core_max_mhz, record.mem_mhz,
            )?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonTable {
    device: u32,
    pstates: Vec<JsonEntry>,
}

#[derive(Serialize)]
struct JsonEntry {
    id: usize,
    // Hexadecimal form, as written to the device
    pstate: String,
    core_min_mhz: i32,
    core_max_mhz: i32,
    mem_mhz: i32,
    profile: Option<EntryProfile>,
}
