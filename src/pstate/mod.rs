pub mod formatter;
pub mod line_parser;
pub mod selector;
pub mod table;

pub use selector::{Profile, Resolution, Selection};
pub use table::PStateTable;

// Id the kernel uses for a state that must never be selected
pub const RESERVED_PSTATE: u8 = 0xAC;

// Clock value used when a line doesn't report a clock
pub const CLOCK_NOT_REPORTED: i32 = -1;

// One row of the device pstate table.
// All clocks are stored in megahertz, `-1` marks a clock that the
// kernel did not report on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PStateRecord {
    pub pstate_id: u8,

    pub core_min_mhz: i32,
    pub core_max_mhz: i32,
    pub mem_mhz: i32,
}

impl PStateRecord {
    // Create a record with no clock reported
    pub fn new(pstate_id: u8) -> Self {
        Self {
            pstate_id,
            core_min_mhz: CLOCK_NOT_REPORTED,
            core_max_mhz: CLOCK_NOT_REPORTED,
            mem_mhz: CLOCK_NOT_REPORTED,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.pstate_id == RESERVED_PSTATE
    }
}

// Encode a pstate id the way the kernel expects it to be written:
// two lowercase hexadecimal digits followed by a newline.
pub fn encode_pstate(pstate: u8) -> String {
    format!("{pstate:02x}\n")
}
