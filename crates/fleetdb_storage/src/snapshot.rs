//! Loading and saving registries as CSV snapshots.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use crate::file::FileBackend;
use crate::format::{DriverRow, DriverRowRef, SnapshotFormat, HEADER};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use fleetdb_core::Registry;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// How to treat bad rows while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip malformed or rejected rows instead of failing on the first.
    pub lenient: bool,
}

impl LoadOptions {
    /// Fail on the first bad row.
    #[must_use]
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    /// Skip bad rows and report them.
    #[must_use]
    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

/// A row skipped by a lenient load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the snapshot.
    pub line: u64,
    /// Why the row was skipped.
    pub reason: String,
}

/// Outcome of a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Layout detected from the header, `None` if there was nothing to read.
    pub format: Option<SnapshotFormat>,
    /// Drivers added to the registry.
    pub loaded: usize,
    /// Rows skipped in lenient mode.
    pub skipped: Vec<SkippedRow>,
}

/// Reads a CSV snapshot from `reader` and adds one driver per row, in
/// file order.
///
/// The header must match [`HEADER`] or the legacy six-column layout,
/// ignoring case. Input with no header at all is an empty snapshot.
///
/// In strict mode the first bad row aborts the load; rows before it stay
/// in the registry. In lenient mode bad rows are logged, skipped and
/// listed in the report.
///
/// # Errors
///
/// Returns [`StorageError::UnsupportedHeader`] for an unknown layout and,
/// in strict mode, [`StorageError::MalformedRow`] or
/// [`StorageError::Rejected`] for the first bad row. I/O failures abort
/// the load in either mode.
pub fn read_csv<R: Read>(
    reader: R,
    registry: &Registry,
    options: LoadOptions,
) -> StorageResult<LoadReport> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let header = csv.headers()?.clone();
    if header.is_empty() {
        return Ok(LoadReport::default());
    }
    let format =
        SnapshotFormat::detect(header.iter()).ok_or_else(|| StorageError::UnsupportedHeader {
            found: header.iter().collect::<Vec<_>>().join(","),
        })?;

    let mut report = LoadReport {
        format: Some(format),
        ..LoadReport::default()
    };
    let mut record = StringRecord::new();
    loop {
        let row = match csv.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map_or(0, csv::Position::line);
                record
                    .deserialize::<DriverRow>(None)
                    .map_err(|e| malformed(line, &e))
            }
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                Err(malformed(line, &e))
            }
        };

        let line = record.position().map_or(0, csv::Position::line);
        let outcome = row.and_then(|row| {
            registry
                .add(row.into_record())
                .map_err(|source| StorageError::Rejected { line, source })
        });
        match outcome {
            Ok(()) => report.loaded += 1,
            Err(e) if options.lenient => {
                let line = e.line().unwrap_or(line);
                warn!(line, error = %e, "skipping snapshot row");
                report.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

fn malformed(line: u64, err: &csv::Error) -> StorageError {
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err: cause, .. } => cause.to_string(),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    StorageError::MalformedRow { line, message }
}

/// Writes every active driver of `registry` to `writer`, in slot order,
/// under [`HEADER`]. Returns the number of rows written.
///
/// Names containing commas, quotes or newlines are quoted.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(registry: &Registry, writer: W) -> StorageResult<usize> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(HEADER)?;
    let written = registry.read(|set| -> StorageResult<usize> {
        let mut written = 0;
        for record in set.iter() {
            csv.serialize(DriverRowRef::from(record))?;
            written += 1;
        }
        Ok(written)
    })?;
    csv.flush()?;
    Ok(written)
}

/// A registry snapshot held by a [`SnapshotBackend`].
///
/// # Example
///
/// ```rust
/// use fleetdb_core::{DriverRecord, Location, Registry};
/// use fleetdb_storage::{LoadOptions, MemoryBackend, Snapshot};
///
/// let registry = Registry::new();
/// registry.add(DriverRecord::new(1, "Dang Quoc Hung", Location::new(2.5, 7.0)))?;
///
/// let mut snapshot = Snapshot::new(MemoryBackend::new());
/// assert_eq!(snapshot.save(&registry)?, 1);
///
/// let restored = Registry::new();
/// let report = snapshot.load(&restored, LoadOptions::strict())?;
/// assert_eq!(report.loaded, 1);
/// assert_eq!(restored.all(), registry.all());
/// # Ok::<(), fleetdb_storage::StorageError>(())
/// ```
#[derive(Debug)]
pub struct Snapshot<B: SnapshotBackend> {
    backend: B,
}

impl Snapshot<FileBackend> {
    /// Snapshot stored in the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(FileBackend::new(path.as_ref()))
    }
}

impl<B: SnapshotBackend> Snapshot<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unwraps the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Adds every driver in the snapshot to `registry`. A backend with no
    /// snapshot yet loads nothing.
    ///
    /// # Errors
    ///
    /// See [`read_csv`].
    pub fn load(&self, registry: &Registry, options: LoadOptions) -> StorageResult<LoadReport> {
        let Some(data) = self.backend.read()? else {
            info!("no snapshot to load");
            return Ok(LoadReport::default());
        };
        let report = read_csv(data.as_slice(), registry, options)?;
        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "snapshot loaded"
        );
        Ok(report)
    }

    /// Replaces the snapshot with the current contents of `registry`.
    /// Returns the number of drivers written.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save(&mut self, registry: &Registry) -> StorageResult<usize> {
        let mut buffer = Vec::new();
        let written = write_csv(registry, &mut buffer)?;
        self.backend.replace(&buffer)?;
        info!(written, bytes = buffer.len(), "snapshot saved");
        Ok(written)
    }
}
