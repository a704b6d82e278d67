//! Partitioned Parquet output
//!
//! Layout, one directory per capture hour:
//! ```text
//! destination/
//!   elt_timestamp=2024-03-05T10:00:00Z/
//!     3f1c...-0.parquet
//! ```

use super::table::{OrganizationTable, PARTITION_COLUMN};
use crate::crunchbase::NormalizedRow;
use crate::etl::Loader;
use arrow_array::RecordBatch;
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Write NormalizedRows as GZIP-compressed Parquet, partitioned by `elt_timestamp`
///
/// Each write adds a uniquely named file per partition; existing files are
/// left in place. A write either lands every partition file or none of them.
pub struct PartitionedParquetWriter {
    destination: PathBuf,
}

impl PartitionedParquetWriter {
    pub fn new(destination: impl AsRef<Path>) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
        }
    }

    /// Write every partition of `table`, returning the files created
    ///
    /// Partitions are staged under hidden temporary names and renamed into
    /// place once all of them are written. On failure the staged files and
    /// any directories this call created are removed.
    pub fn write_table(&self, table: &OrganizationTable) -> Result<Vec<PathBuf>> {
        let mut staging = Staging::default();

        let result = self
            .stage(table, &mut staging)
            .and_then(|()| staging.commit());
        if result.is_err() {
            staging.rollback();
        }
        result
    }

    fn stage(&self, table: &OrganizationTable, staging: &mut Staging) -> Result<()> {
        for (timestamp, batch) in table.partitions()? {
            let dir = self.destination.join(partition_dir_name(timestamp));
            staging.create_dir(&dir)?;

            let name = format!("{}-0.parquet", uuid::Uuid::new_v4().simple());
            let temp = dir.join(format!(".{}.tmp", name));
            staging.pending.push((temp.clone(), dir.join(name)));

            write_parquet(&temp, &batch)?;
            log::debug!("Staged {} row(s) in {}", batch.num_rows(), temp.display());
        }
        Ok(())
    }
}

/// Files and directories created by one `write_table` call
#[derive(Default)]
struct Staging {
    created_dirs: Vec<PathBuf>,
    /// (temporary path, final path)
    pending: Vec<(PathBuf, PathBuf)>,
    committed: Vec<PathBuf>,
}

impl Staging {
    fn create_dir(&mut self, dir: &Path) -> Result<()> {
        self.created_dirs.extend(
            dir.ancestors()
                .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
                .map(Path::to_path_buf),
        );
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }

    fn commit(&mut self) -> Result<Vec<PathBuf>> {
        for (temp, path) in &self.pending {
            std::fs::rename(temp, path)
                .with_context(|| format!("Failed to move {} into place", path.display()))?;
            self.committed.push(path.clone());
        }
        Ok(self.committed.clone())
    }

    fn rollback(&mut self) {
        let staged = self.pending.iter().map(|(temp, _)| temp);
        for path in self.committed.iter().chain(staged) {
            match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                }
                _ => {}
            }
        }

        // Deepest first, so parents are empty by the time they are reached
        self.created_dirs
            .sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
        for dir in &self.created_dirs {
            let _ = std::fs::remove_dir(dir);
        }
    }
}

impl Loader for PartitionedParquetWriter {
    type Item = NormalizedRow;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let table = OrganizationTable::from_rows(items);
        if table.is_empty() {
            log::debug!("No rows to write");
            return Ok(0);
        }

        let files = self.write_table(&table)?;

        log::info!(
            "Wrote {} row(s) in {} partition(s) under {}",
            table.len(),
            files.len(),
            self.destination.display()
        );

        Ok(table.len())
    }
}

/// Hive-style directory name for a partition value
pub fn partition_dir_name(timestamp: DateTime<Utc>) -> String {
    format!(
        "{}={}",
        PARTITION_COLUMN,
        timestamp.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::GZIP(GzipLevel::default()))
        .build();

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .with_context(|| format!("Failed to open parquet writer {}", path.display()))?;
    writer
        .write(batch)
        .with_context(|| format!("Failed to write record batch {}", path.display()))?;
    writer
        .close()
        .with_context(|| format!("Failed to close parquet writer {}", path.display()))?;
    Ok(())
}
