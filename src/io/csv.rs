//! Best-effort streaming CSV reader.
//!
//! This module provides:
//! - **Header normalisation**: blank names become `Unnamed: <i>`, duplicates get
//!   `.1`, `.2`, … suffixes ([`normalize_headers`]).
//! - **Record reading** that skips malformed records: [`CsvRecordReader::next_record`].
//! - **Bounded batching**: [`CsvRecordReader::read_batch`] and the [`CsvBatches`]
//!   iterator yield at most `n` well-formed records at a time.
//!
//! # Design notes
//! - A record is *malformed* when its field count differs from the header's or
//!   it is not valid UTF-8. Malformed records are counted and dropped; they never
//!   count toward a batch. Short records are dropped too rather than padded
//!   with nulls, so a truncated line never yields a partly empty row.
//! - Only errors of the underlying byte stream (I/O, decompression) are returned.
//! - Inputs are decompressed transparently via
//!   [`auto_detect_reader`](crate::io::compression::auto_detect_reader).

use crate::config::CsvOptions;
use crate::error::ReadError;
use crate::io::compression::auto_detect_reader;
use csv::{ByteRecord, StringRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Streaming reader over one CSV input. Holds at most one record at a time;
/// callers decide how many to keep.
pub struct CsvRecordReader {
    inner: csv::Reader<Box<dyn Read>>,
    path: PathBuf,
    headers: Vec<String>,
    scratch: ByteRecord,
    /// Data records seen so far, well-formed or not.
    seen: u64,
    skipped: u64,
}

impl CsvRecordReader {
    /// Open `path` and read its header row.
    ///
    /// # Errors
    /// [`ReadError::Open`] if the file cannot be opened or decompression cannot
    /// start, [`ReadError::Header`] if the header row cannot be read or is not
    /// UTF-8, and [`ReadError::MissingHeader`] for an empty input.
    pub fn open(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self, ReadError> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).map_err(|source| ReadError::Open {
            path: path.clone(),
            source,
        })?;
        let rdr = auto_detect_reader(f, &path).map_err(|source| ReadError::Open {
            path: path.clone(),
            source,
        })?;
        let mut inner = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_reader(rdr);

        let raw = inner
            .headers()
            .map_err(|source| ReadError::Header {
                path: path.clone(),
                source,
            })?
            .clone();
        if raw.is_empty() {
            return Err(ReadError::MissingHeader { path });
        }
        let headers = normalize_headers(raw.iter());

        Ok(Self {
            inner,
            path,
            headers,
            scratch: ByteRecord::new(),
            seen: 0,
            skipped: 0,
        })
    }

    /// Normalised column names, in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Malformed records dropped so far.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Next well-formed record, or `None` at end of input.
    ///
    /// # Errors
    /// [`ReadError::Record`] when the underlying stream fails.
    pub fn next_record(&mut self) -> Result<Option<StringRecord>, ReadError> {
        loop {
            match self.inner.read_byte_record(&mut self.scratch) {
                Ok(false) => return Ok(None),
                Ok(true) => {
                    self.seen += 1;
                    if self.scratch.len() != self.headers.len() {
                        self.skip("field count differs from header");
                        continue;
                    }
                    match StringRecord::from_byte_record(std::mem::take(&mut self.scratch)) {
                        Ok(rec) => return Ok(Some(rec)),
                        Err(err) => {
                            self.scratch = err.into_byte_record();
                            self.skip("invalid UTF-8");
                        }
                    }
                }
                Err(err) if err.is_io_error() => {
                    return Err(ReadError::Record {
                        path: self.path.clone(),
                        record: self.seen + 1,
                        source: err,
                    });
                }
                Err(err) => {
                    self.seen += 1;
                    debug!(path = %self.path.display(), error = %err, "unparseable CSV record");
                    self.skipped += 1;
                }
            }
        }
    }

    fn skip(&mut self, reason: &'static str) {
        self.skipped += 1;
        debug!(
            path = %self.path.display(),
            record = self.seen,
            line = self.scratch.position().map(csv::Position::line),
            reason,
            "skipping malformed CSV record"
        );
    }

    /// Read up to `max` well-formed records. An empty vector means end of input.
    ///
    /// # Errors
    /// See [`next_record`](Self::next_record).
    pub fn read_batch(&mut self, max: usize) -> Result<Vec<StringRecord>, ReadError> {
        // Full-load callers pass usize::MAX.
        let mut out = Vec::with_capacity(max.min(64 * 1024));
        while out.len() < max {
            match self.next_record()? {
                Some(rec) => out.push(rec),
                None => break,
            }
        }
        Ok(out)
    }

    /// Turn the reader into an iterator of batches of `batch_size` records.
    /// `batch_size` of zero is treated as 1.
    #[must_use]
    pub fn batches(self, batch_size: usize) -> CsvBatches {
        CsvBatches {
            reader: self,
            batch_size: batch_size.max(1),
            done: false,
        }
    }
}

/// Iterator of bounded record batches; see [`CsvRecordReader::batches`].
///
/// Yields `Ok(batch)` with `1..=batch_size` records; only the final batch may
/// be shorter. After an error or end of input it yields `None`.
pub struct CsvBatches {
    reader: CsvRecordReader,
    batch_size: usize,
    done: bool,
}

impl CsvBatches {
    #[must_use]
    pub fn headers(&self) -> &[String] {
        self.reader.headers()
    }

    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.reader.skipped()
    }
}

impl Iterator for CsvBatches {
    type Item = Result<Vec<StringRecord>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_batch(self.batch_size) {
            Ok(batch) if batch.is_empty() => {
                self.done = true;
                None
            }
            Ok(batch) => Some(Ok(batch)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Replace blank header names with `Unnamed: <index>` and make duplicates
/// unique with `.<n>` suffixes, keeping column order.
pub fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (i, name) in raw.into_iter().enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {i}"),
            trimmed => trimmed.to_string(),
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_duplicate_headers() {
        let got = normalize_headers(["id", "", "id", "name", "id"]);
        assert_eq!(got, vec!["id", "Unnamed: 1", "id.1", "name", "id.2"]);
    }

    #[test]
    fn suffix_collision_with_existing_name() {
        let got = normalize_headers(["a.1", "a", "a"]);
        assert_eq!(got, vec!["a.1", "a", "a.2"]);
    }
}
