use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Copy of the originals, created inside the working directory.
pub const BACKUP_DIR: &str = "BACKUP";

/// Print-ready copies, created inside the working directory.
pub const LOW_RES_DIR: &str = "LOWRES";

/// Target for 10x15 cm prints at 300 DPI (102x152 mm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintProfile {
    pub long_side: u32,
    pub short_side: u32,
    pub quality: u8,
    pub dpi: u16,
}

pub const PRINT_10X15: PrintProfile = PrintProfile {
    long_side: 1795,
    short_side: 1205,
    quality: 85,
    dpi: 300,
};

/// Everything a conversion run needs to know. Lives for one session only.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub working_dir: PathBuf,
    pub backup: bool,
    pub sort_by_date: bool,
    pub date_in_name: bool,
    pub low_res: bool,
    pub print: PrintProfile,
}

impl SessionConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            backup: true,
            sort_by_date: true,
            date_in_name: true,
            low_res: true,
            print: PRINT_10X15,
        }
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.working_dir.join(BACKUP_DIR)
    }

    pub fn low_res_dir(&self) -> PathBuf {
        self.working_dir.join(LOW_RES_DIR)
    }

    /// Switch to another existing directory.
    pub fn set_working_dir(&mut self, dir: &Path) -> Result<()> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Folder not found: {}", dir.display()))?;
        if !dir.is_dir() {
            anyhow::bail!("{} is not a folder", dir.display());
        }
        self.working_dir = dir;
        Ok(())
    }
}
