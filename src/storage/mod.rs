//! Output storage
//!
//! Rows from a run are collected into an [`OrganizationTable`] and written
//! once as Parquet files partitioned by capture hour.

mod parquet_writer;
mod table;

pub use parquet_writer::{PartitionedParquetWriter, partition_dir_name};
pub use table::{DATA_COLUMNS, OrganizationTable, PARTITION_COLUMN};
