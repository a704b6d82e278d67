//! In-memory output table

use crate::crunchbase::NormalizedRow;
use arrow_array::{ArrayRef, RecordBatch, StringArray, TimestampMicrosecondArray};
use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use std::sync::Arc;

/// Column the output is partitioned by
pub const PARTITION_COLUMN: &str = "elt_timestamp";

/// String columns, in output order
pub const DATA_COLUMNS: &[&str] = &[
    "name",
    "created_at",
    "permalink",
    "website",
    "updated_at",
    "linkedin",
    "location_identifiers",
    "short_description",
];

/// Rows accumulated by one run before the single write
#[derive(Debug, Default)]
pub struct OrganizationTable {
    rows: Vec<NormalizedRow>,
}

impl OrganizationTable {
    pub fn from_rows(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full schema: the string columns followed by the UTC capture timestamp
    pub fn schema() -> SchemaRef {
        let mut fields = data_fields();
        fields.push(Field::new(
            PARTITION_COLUMN,
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ));
        Arc::new(Schema::new(fields))
    }

    /// Split rows by capture timestamp, one batch per distinct value
    ///
    /// Batches come back in ascending timestamp order, keep row order within
    /// each partition and leave out the partition column.
    pub fn partitions(&self) -> Result<Vec<(DateTime<Utc>, RecordBatch)>> {
        let mut rows: Vec<&NormalizedRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.elt_timestamp);

        let data: Vec<usize> = (0..DATA_COLUMNS.len()).collect();
        let batch = record_batch(&rows)?
            .project(&data)
            .context("Failed to drop partition column")?;

        let mut partitions = Vec::new();
        let mut offset = 0;
        for group in rows.chunk_by(|a, b| a.elt_timestamp == b.elt_timestamp) {
            partitions.push((group[0].elt_timestamp, batch.slice(offset, group.len())));
            offset += group.len();
        }
        Ok(partitions)
    }
}

/// Rows as one batch, partition column included
fn record_batch(rows: &[&NormalizedRow]) -> Result<RecordBatch> {
    let mut columns = data_columns(rows);
    let timestamps: Vec<i64> = rows
        .iter()
        .map(|r| r.elt_timestamp.timestamp_micros())
        .collect();
    columns.push(Arc::new(
        TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"),
    ));

    RecordBatch::try_new(OrganizationTable::schema(), columns)
        .context("Failed to build organization table")
}

fn data_fields() -> Vec<Field> {
    DATA_COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, false))
        .collect()
}

fn data_columns(rows: &[&NormalizedRow]) -> Vec<ArrayRef> {
    let extractors: [fn(&NormalizedRow) -> &str; 8] = [
        |r| r.name.as_str(),
        |r| r.created_at.as_str(),
        |r| r.permalink.as_str(),
        |r| r.website.as_str(),
        |r| r.updated_at.as_str(),
        |r| r.linkedin.as_str(),
        |r| r.location_identifiers.as_str(),
        |r| r.short_description.as_str(),
    ];

    extractors
        .iter()
        .map(|get| {
            let values: Vec<&str> = rows.iter().map(|r| get(*r)).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Array;
    use chrono::TimeZone;

    fn row(name: &str, hour: u32) -> NormalizedRow {
        NormalizedRow {
            name: name.to_string(),
            created_at: "2015-01-01T00:00:00Z".to_string(),
            permalink: name.to_lowercase(),
            website: format!("https://{}.com", name.to_lowercase()),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            linkedin: format!("https://linkedin.com/company/{}", name.to_lowercase()),
            location_identifiers: "city: Oslo".to_string(),
            short_description: "desc".to_string(),
            elt_timestamp: Utc.with_ymd_and_hms(2024, 3, 5, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_batch_has_all_columns() {
        let rows = [row("Acme", 10), row("Beta", 10)];
        let batch = record_batch(&rows.iter().collect::<Vec<_>>()).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 9);

        let names = batch
            .column_by_name("name")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(1), "Beta");

        let timestamps = batch
            .column_by_name(PARTITION_COLUMN)
            .unwrap()
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        assert_eq!(
            timestamps.value(0),
            Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0)
                .unwrap()
                .timestamp_micros()
        );
        assert_eq!(timestamps.null_count(), 0);
    }

    #[test]
    fn test_empty_table() {
        let table = OrganizationTable::default();
        assert!(table.is_empty());
        assert_eq!(record_batch(&[]).unwrap().num_rows(), 0);
        assert!(table.partitions().unwrap().is_empty());
    }

    #[test]
    fn test_partitions_split_by_hour() {
        let table =
            OrganizationTable::from_rows(vec![row("Late", 11), row("Early", 10), row("Later", 11)]);

        let partitions = table.partitions().unwrap();
        assert_eq!(partitions.len(), 2);

        let (first_ts, first) = &partitions[0];
        assert_eq!(first_ts.format("%H").to_string(), "10");
        assert_eq!(first.num_rows(), 1);
        assert!(first.column_by_name(PARTITION_COLUMN).is_none());
        assert_eq!(first.num_columns(), DATA_COLUMNS.len());

        let (_, second) = &partitions[1];
        let names = second
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(0), "Late");
        assert_eq!(names.value(1), "Later");
    }
}
