//! A ledger backed by a JSON file and shared between processes.
//!
//! Opening takes an exclusive lock on `<path>.lock` and keeps it until the
//! `LedgerFile` is dropped, so each process works on the state the previous
//! one saved. The lock lives in a sidecar file because `Ledger::save`
//! replaces the ledger file itself by rename.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs4::fs_std::FileExt;
use ledger_core::Program;
use log::debug;

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::ledger::Ledger;

pub struct LedgerFile {
    path: PathBuf,
    ledger: Arc<Ledger>,
    // Released when the handle closes.
    _lock: File,
}

impl LedgerFile {
    /// Lock `path`, then load it (or start empty) with `programs` registered.
    /// Blocks while another handle holds the lock.
    pub fn open(
        config: LedgerConfig,
        path: impl AsRef<Path>,
        programs: impl IntoIterator<Item = Arc<dyn Program>>,
    ) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock_path = lock_path(&path);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        debug!("waiting for {}", lock_path.display());
        FileExt::lock_exclusive(&lock)?;
        debug!("locked {}", lock_path.display());

        let mut ledger = Ledger::load_or_new(config, &path)?;
        for program in programs {
            ledger.register_program(program);
        }
        Ok(Self {
            path,
            ledger: Arc::new(ledger),
            _lock: lock,
        })
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state back. The lock stays held.
    pub fn save(&self) -> Result<(), LedgerError> {
        self.ledger.save(&self.path)
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
