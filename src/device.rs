use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::{
    errors::{DeviceError, NoupstateError},
    pstate::{PStateTable, encode_pstate},
};

pub const DEFAULT_DEBUGFS_ROOT: &str = "/sys/kernel/debug";

// Access to the pstate interface of one graphics device
pub trait PStateDevice {
    // Device index under the dri debugfs directory
    fn index(&self) -> u32;

    // Return the raw content of the pstate file
    fn read_pstate_blob(&self) -> Result<String, DeviceError>;

    // Switch the device to the given pstate
    fn write_pstate(&self, pstate: u8) -> Result<(), DeviceError>;

    // Read and parse the device pstate table
    fn read_table(&self) -> Result<PStateTable, NoupstateError> {
        let blob = self.read_pstate_blob()?;

        Ok(PStateTable::parse(&blob, self.index())?)
    }
}

// A device reached through `<debugfs>/dri/<index>/pstate`
#[derive(Debug, Clone)]
pub struct DebugfsDevice {
    index: u32,
    path: PathBuf,
}

impl DebugfsDevice {
    pub fn new(index: u32) -> Self {
        Self::with_root(Path::new(DEFAULT_DEBUGFS_ROOT), index)
    }

    // Use a debugfs mounted somewhere other than the default location
    pub fn with_root(debugfs_root: &Path, index: u32) -> Self {
        Self {
            index,
            path: pstate_path(debugfs_root, index),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PStateDevice for DebugfsDevice {
    fn index(&self) -> u32 {
        self.index
    }

    fn read_pstate_blob(&self) -> Result<String, DeviceError> {
        debug!("Reading pstates from: {:?}", self.path);

        fs::read_to_string(&self.path).map_err(|source| DeviceError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn write_pstate(&self, pstate: u8) -> Result<(), DeviceError> {
        let write_err = |source| DeviceError::Write {
            path: self.path.clone(),
            source,
        };

        let value = encode_pstate(pstate);
        trace!("Writing {:?} to {:?}", value, self.path);

        // The file is only ever opened write-only, never created or truncated
        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(write_err)?;

        file.write_all(value.as_bytes()).map_err(write_err)?;

        Ok(())
    }
}

pub fn pstate_path(debugfs_root: &Path, index: u32) -> PathBuf {
    debugfs_root
        .join("dri")
        .join(index.to_string())
        .join("pstate")
}
