use anyhow::Result;
use csv_splitter::testing::{CsvFixture, numbered_row, read_rows};
use csv_splitter::{CsvOptions, SegmentCompression, convert_dir, convert_file};
use std::fs;

#[test]
fn convert_file_defaults_to_sibling_parquet() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = CsvFixture::numbered(20).write(tmp.path().join("data.csv"))?;

    let out = convert_file(&input, None, &CsvOptions::default(), SegmentCompression::Snappy)?;
    assert_eq!(out, tmp.path().join("data.parquet"));
    assert_eq!(read_rows(&out)?, (0..20).map(numbered_row).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn convert_file_creates_parent_dirs() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = CsvFixture::numbered(3).write(tmp.path().join("data.csv"))?;
    let target = tmp.path().join("nested").join("deeper").join("x.parquet");

    let out = convert_file(
        &input,
        Some(&target),
        &CsvOptions::default(),
        SegmentCompression::Uncompressed,
    )?;
    assert_eq!(out, target);
    assert_eq!(read_rows(&target)?.len(), 3);
    Ok(())
}

#[test]
fn convert_file_reports_missing_input() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let err = convert_file(
        tmp.path().join("missing.csv"),
        None,
        &CsvOptions::default(),
        SegmentCompression::Snappy,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));
    Ok(())
}

#[test]
fn convert_dir_mirrors_layout_and_skips_failures() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("2024").join("jan"))?;
    CsvFixture::numbered(2).write(src.join("a.csv"))?;
    CsvFixture::numbered(4).write(src.join("2024").join("jan").join("b.csv"))?;
    fs::write(src.join("2024").join("empty.csv"), "")?;
    fs::write(src.join("notes.txt"), "not csv")?;
    let dst = tmp.path().join("dst");

    let converted = convert_dir(&src, Some(&dst), &CsvOptions::default(), SegmentCompression::Snappy)?;

    assert_eq!(
        converted,
        vec![
            dst.join("2024").join("jan").join("b.parquet"),
            dst.join("a.parquet"),
        ]
    );
    assert_eq!(read_rows(dst.join("a.parquet"))?.len(), 2);
    assert_eq!(read_rows(dst.join("2024/jan/b.parquet"))?.len(), 4);
    assert!(!dst.join("2024").join("empty.parquet").exists());
    Ok(())
}

#[test]
fn convert_dir_in_place() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    CsvFixture::numbered(1).write(tmp.path().join("one.csv"))?;

    let converted = convert_dir(tmp.path(), None, &CsvOptions::default(), SegmentCompression::Snappy)?;
    assert_eq!(converted, vec![tmp.path().join("one.parquet")]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn converted_file_is_world_readable() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir()?;
    let input = CsvFixture::numbered(3).write(tmp.path().join("data.csv"))?;
    let out = convert_file(&input, None, &CsvOptions::default(), SegmentCompression::Snappy)?;
    assert_eq!(fs::metadata(&out)?.permissions().mode() & 0o777, 0o644);
    Ok(())
}
