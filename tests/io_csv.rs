use anyhow::Result;
use csv_splitter::io::csv::CsvRecordReader;
use csv_splitter::testing::CsvFixture;
use csv_splitter::{CsvOptions, ReadError};
use std::fs;

#[test]
fn batches_never_exceed_requested_size() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(23).write(tmp.path().join("rows.csv"))?;

    let reader = CsvRecordReader::open(&path, &CsvOptions::default())?;
    assert_eq!(reader.path(), path.as_path());
    let mut batches = reader.batches(5);
    assert_eq!(batches.headers(), ["id", "name", "score"]);

    let sizes = batches
        .by_ref()
        .map(|b| b.map(|records| records.len()))
        .collect::<Result<Vec<_>, ReadError>>()?;
    assert_eq!(sizes, vec![5, 5, 5, 5, 3]);
    assert_eq!(batches.skipped(), 0);
    Ok(())
}

#[test]
fn headers_are_normalized() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("dupes.csv");
    fs::write(&path, "id,,id\n1,2,3\n")?;

    let reader = CsvRecordReader::open(&path, &CsvOptions::default())?;
    assert_eq!(reader.headers(), ["id", "Unnamed: 1", "id.1"]);
    Ok(())
}

#[test]
fn quoted_fields_with_delimiters_and_newlines() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("quoted.csv");
    fs::write(&path, "id,text\n1,\"a,b\"\n2,\"line\nbreak\"\n")?;

    let mut reader = CsvRecordReader::open(&path, &CsvOptions::default())?;
    let records = reader.read_batch(10)?;
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "a,b");
    assert_eq!(&records[1][1], "line\nbreak");
    assert_eq!(reader.skipped(), 0);
    Ok(())
}

#[test]
fn blank_lines_are_ignored() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("blank.csv");
    fs::write(&path, "a,b\n1,2\n\n3,4\n\n")?;

    let mut reader = CsvRecordReader::open(&path, &CsvOptions::default())?;
    assert_eq!(reader.read_batch(10)?.len(), 2);
    assert_eq!(reader.skipped(), 0);
    Ok(())
}

#[test]
fn open_errors_are_typed() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let missing = CsvRecordReader::open(tmp.path().join("nope.csv"), &CsvOptions::default());
    assert!(matches!(missing, Err(ReadError::Open { .. })));

    let empty = tmp.path().join("empty.csv");
    fs::write(&empty, "")?;
    let empty = CsvRecordReader::open(&empty, &CsvOptions::default());
    assert!(matches!(empty, Err(ReadError::MissingHeader { .. })));
    Ok(())
}
