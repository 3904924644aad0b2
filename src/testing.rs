//! Fixtures for tests of CSV splitting.
//!
//! - [`CsvFixture`] builds CSV inputs, well-formed or deliberately broken.
//! - [`read_rows`] reads a Parquet file back as rows of display strings.
//! - [`RecordingProgress`] records every observer callback.
//!
//! ```
//! use csv_splitter::testing::CsvFixture;
//!
//! let csv = CsvFixture::numbered(2).raw_line("oops,too,many,fields").to_csv_string();
//! assert_eq!(csv.lines().count(), 4);
//! ```

use crate::io::parquet::read_parquet_batches;
use crate::plan::ChunkPlan;
use crate::progress::ProgressObserver;
use crate::split::Segment;
use anyhow::{Context, Result};
use arrow::util::display::array_value_to_string;
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory CSV document written on demand.
#[derive(Clone, Debug, Default)]
pub struct CsvFixture {
    header: Vec<String>,
    lines: Vec<String>,
}

impl CsvFixture {
    #[must_use]
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(ToString::to_string).collect(),
            lines: Vec::new(),
        }
    }

    /// `id,name,score` with `n` rows from [`numbered_row`].
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        (0..n).fold(Self::new(&["id", "name", "score"]), |f, i| {
            f.row(&numbered_row(i))
        })
    }

    /// Append a record; fields are joined with `,` without quoting.
    #[must_use]
    pub fn row<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        let line = fields.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.lines.push(line);
        self
    }

    /// Append a line verbatim.
    #[must_use]
    pub fn raw_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let mut out = self.header.join(",");
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Write the document to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        fs::write(path, self.to_csv_string())
            .with_context(|| format!("write fixture {}", path.display()))?;
        Ok(path.to_path_buf())
    }
}

/// Row `i` of [`CsvFixture::numbered`]: `[i, name_i, i.5]`.
#[must_use]
pub fn numbered_row(i: usize) -> Vec<String> {
    vec![i.to_string(), format!("name_{i}"), format!("{i}.5")]
}

/// Every row of a Parquet file as display strings (nulls render as `""`).
///
/// # Errors
/// Returns an error if the file cannot be read or a value cannot be formatted.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let (_, batches) =
        read_parquet_batches(path, 8192).with_context(|| format!("read {}", path.display()))?;
    let mut rows = Vec::new();
    for batch in &batches {
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|col| array_value_to_string(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(values);
        }
    }
    Ok(rows)
}

/// Column names of a Parquet file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn column_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let (schema, _) = read_parquet_batches(path, 1)?;
    Ok(schema.fields().iter().map(|f| f.name().clone()).collect())
}

/// Observer that keeps every event for later assertions.
#[derive(Clone, Debug, Default)]
pub struct RecordingProgress {
    pub plans: Vec<ChunkPlan>,
    pub advisories: Vec<String>,
    pub segments: Vec<Segment>,
    pub finished: Option<Vec<Segment>>,
}

impl ProgressObserver for RecordingProgress {
    fn on_plan(&mut self, plan: &ChunkPlan) {
        self.plans.push(*plan);
    }

    fn on_advisory(&mut self, message: &str) {
        self.advisories.push(message.to_string());
    }

    fn on_segment(&mut self, segment: &Segment) {
        self.segments.push(segment.clone());
    }

    fn on_finish(&mut self, segments: &[Segment]) {
        self.finished = Some(segments.to_vec());
    }
}
