//! Durable record sink
//!
//! Every harvested record is appended to two files before `append` returns:
//! a line-delimited JSON log and a tabular file with a fixed column order.
//! The tabular data row count is the resume cursor for the whole system, so
//! the in-memory count is only bumped after both writes have been fsynced;
//! count and stored rows cannot drift apart.
//!
//! Append order matters for crash safety: the JSON line is written before the
//! tabular row. A kill between the two leaves the tabular count short, so the
//! item is re-harvested on resume instead of being silently skipped.

use crate::config::OutputConfig;
use crate::error::PersistError;
use crate::types::ProductRecord;
use crate::utils::{format_row, parse_rows};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column order of the tabular output
pub const TABLE_COLUMNS: [&str; 6] = [
    "url",
    "product_name",
    "cheapest_price",
    "stock",
    "status",
    "observed_at",
];

/// Append-only sink owning every durable output artifact of a run
pub struct RecordSink {
    jsonl: File,
    jsonl_path: PathBuf,
    table: File,
    table_path: PathBuf,
    snapshot_path: PathBuf,
    durable: usize,
    run_records: Vec<ProductRecord>,
}

impl RecordSink {
    /// Open (or create) the output files and derive the resume position from
    /// the tabular output's existing data rows.
    ///
    /// The tabular header is written exactly once, when the file is new or
    /// empty.
    pub fn open(output: &OutputConfig) -> crate::error::Result<Self> {
        for path in [&output.jsonl_path, &output.table_path, &output.snapshot_path] {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
        }

        let existing = match std::fs::read_to_string(&output.table_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        let durable = parse_rows(&existing).len().saturating_sub(1);

        let mut table = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&output.table_path)?;
        if existing.is_empty() {
            let header: Vec<String> = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
            table.write_all(format_row(&header).as_bytes())?;
            table.sync_all()?;
        }

        let jsonl = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&output.jsonl_path)?;

        tracing::info!(
            table = %output.table_path.display(),
            durable,
            "record sink ready"
        );

        Ok(Self {
            jsonl,
            jsonl_path: output.jsonl_path.clone(),
            table,
            table_path: output.table_path.clone(),
            snapshot_path: output.snapshot_path.clone(),
            durable,
            run_records: Vec::new(),
        })
    }

    /// Durably append one record to every output representation.
    ///
    /// When this returns `Ok`, the record has been fsynced to both the JSON
    /// log and the tabular file and is reflected in [`Self::durable_count`].
    pub fn append(&mut self, record: &ProductRecord) -> Result<(), PersistError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        write_synced(&mut self.jsonl, &self.jsonl_path, line.as_bytes())?;

        let row = table_row(record);
        write_synced(&mut self.table, &self.table_path, format_row(&row).as_bytes())?;

        self.durable += 1;
        self.run_records.push(record.clone());
        Ok(())
    }

    /// Number of records durably recorded in the tabular output.
    ///
    /// Work items are processed in strict input order, so this count is the
    /// resume offset into the input list.
    pub fn durable_count(&self) -> usize {
        self.durable
    }

    /// Records appended during this run (excludes rows from prior runs)
    pub fn appended_this_run(&self) -> usize {
        self.run_records.len()
    }

    /// Write the aggregate snapshot: a single JSON array of this run's
    /// records. Called once at run completion, not incrementally.
    pub fn finalize(&self) -> Result<(), PersistError> {
        let body = serde_json::to_string_pretty(&self.run_records)?;
        std::fs::write(&self.snapshot_path, body).map_err(|e| PersistError::Snapshot {
            path: self.snapshot_path.clone(),
            source: e,
        })?;
        tracing::info!(
            snapshot = %self.snapshot_path.display(),
            records = self.run_records.len(),
            "aggregate snapshot written"
        );
        Ok(())
    }
}

fn write_synced(file: &mut File, path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let io = |e: std::io::Error| PersistError::Append {
        path: path.to_path_buf(),
        source: e,
    };
    file.write_all(bytes).map_err(io)?;
    file.flush().map_err(io)?;
    file.sync_all().map_err(io)
}

fn table_row(record: &ProductRecord) -> Vec<String> {
    vec![
        record.url.to_string(),
        record.product_name.clone().unwrap_or_default(),
        record
            .cheapest_price
            .map(|p| p.to_string())
            .unwrap_or_default(),
        record.stock.to_string(),
        record.status.to_string(),
        record.observed_at.to_rfc3339(),
    ]
}
