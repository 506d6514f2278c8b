//! JSON-file ledger of calculated loan records.
//!
//! Every mutation is a locked read-modify-write: an exclusive `<store>.lock`
//! file is created before the records are read and removed once the new
//! contents have been renamed into place. The lock holds the writer's PID.
//! A writer killed mid-update leaves its lock behind; nothing reclaims it
//! automatically, and `LedgerError::Locked` reports the recorded PID so the
//! file can be removed once that process is confirmed gone.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use loan_ledger_core::record::{DISPLAY_LABELS, RAW_FIELDS};
use loan_ledger_core::{CalculationError, LoanCalculator, LoanRecord, RawLoanInput};

const CREATED_AT_LABEL: &str = "Created At";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Ledger file {} is not valid: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Ledger {} is locked by {} (remove its .lock file if that process is gone)",
        .path.display(),
        .holder.map_or_else(|| "another writer".to_string(), |pid| format!("process {pid}"))
    )]
    Locked { path: PathBuf, holder: Option<u32> },

    #[error("No record at index {index}; the ledger holds {len}")]
    NotFound { index: usize, len: usize },

    #[error("Unknown loan field: {0}")]
    UnknownField(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

fn storage(path: &Path) -> impl FnOnce(io::Error) -> LedgerError + '_ {
    move |source| LedgerError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

/// Held for the duration of one read-modify-write.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(store: &Path) -> Result<Self, LedgerError> {
        let path = sibling(store, "lock");
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let guard = Self { path };
                write!(file, "{}", std::process::id()).map_err(storage(&guard.path))?;
                Ok(guard)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(LedgerError::Locked {
                path: store.to_path_buf(),
                holder: fs::read_to_string(&path)
                    .ok()
                    .and_then(|pid| pid.trim().parse().ok()),
            }),
            Err(e) => Err(storage(&path)(e)),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Records are addressed by their zero-based position in the file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records; a missing file is an empty ledger.
    pub fn load(&self) -> Result<Vec<LoanRecord>, LedgerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(&self.path)(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub fn get(&self, index: usize) -> Result<LoanRecord, LedgerError> {
        let records = self.load()?;
        let len = records.len();
        records
            .into_iter()
            .nth(index)
            .ok_or(LedgerError::NotFound { index, len })
    }

    /// Calculate `raw` and append the record. Nothing is stored on failure.
    pub fn add(
        &self,
        calculator: &LoanCalculator,
        raw: RawLoanInput,
    ) -> Result<(usize, LoanRecord), LedgerError> {
        let record = calculator.calculate(raw)?;
        self.modify(|records| {
            records.push(record.clone());
            Ok((records.len() - 1, record))
        })
    }

    /// Apply field changes to the stored raw input, recalculate, and replace
    /// the record. Changes may be keyed by machine key or form label.
    pub fn update(
        &self,
        calculator: &LoanCalculator,
        index: usize,
        changes: &BTreeMap<String, String>,
    ) -> Result<LoanRecord, LedgerError> {
        self.modify(|records| {
            let len = records.len();
            let slot = records
                .get_mut(index)
                .ok_or(LedgerError::NotFound { index, len })?;

            let mut fields = slot.raw.to_fields();
            for (name, value) in changes {
                let field = RAW_FIELDS
                    .iter()
                    .find(|f| f.key == name.as_str() || f.label == name.as_str())
                    .ok_or_else(|| LedgerError::UnknownField(name.clone()))?;
                fields.insert(field.key.to_string(), value.clone());
            }

            let record = calculator.calculate(RawLoanInput::from_fields(&fields)?)?;
            *slot = record.clone();
            Ok(record)
        })
    }

    pub fn delete(&self, index: usize) -> Result<LoanRecord, LedgerError> {
        self.modify(|records| {
            let len = records.len();
            if index >= len {
                return Err(LedgerError::NotFound { index, len });
            }
            Ok(records.remove(index))
        })
    }

    /// Write every record as one CSV row: display fields, raw fields, then
    /// the creation time. Returns the number of rows.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, LedgerError> {
        let records = self.load()?;
        let mut wtr = csv::Writer::from_writer(writer);

        let header = DISPLAY_LABELS
            .iter()
            .copied()
            .chain(RAW_FIELDS.iter().map(|f| f.label))
            .chain(std::iter::once(CREATED_AT_LABEL));
        wtr.write_record(header)?;

        for record in &records {
            let created_at = record.created_at.to_rfc3339();
            let row = record
                .display
                .labelled()
                .into_iter()
                .map(|(_, value)| value)
                .chain(record.raw.entries().into_iter().map(|(_, value)| value))
                .chain(std::iter::once(created_at.as_str()));
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;

        info!(rows = records.len(), "exported ledger");
        Ok(records.len())
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<LoanRecord>) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let _guard = LockGuard::acquire(&self.path)?;
        let mut records = self.load()?;
        let out = f(&mut records)?;
        self.persist(&records)?;
        Ok(out)
    }

    fn persist(&self, records: &[LoanRecord]) -> Result<(), LedgerError> {
        let tmp = sibling(&self.path, "tmp");
        let json = serde_json::to_string_pretty(records).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&tmp, json).map_err(storage(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(storage(&self.path))?;
        debug!(path = %self.path.display(), records = records.len(), "ledger written");
        Ok(())
    }
}
