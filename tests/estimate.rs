use anyhow::Result;
use csv_splitter::io::csv::CsvRecordReader;
use csv_splitter::io::parquet::records_to_batch;
use csv_splitter::testing::CsvFixture;
use csv_splitter::{
    CsvOptions, Estimate, EstimationError, SplitOptions, estimate_records_per_segment,
    sample_statistics,
};
use std::fs;

#[test]
fn small_input_is_sampled_completely() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(50).write(tmp.path().join("small.csv"))?;

    let stats = sample_statistics(&path, &CsvOptions::default(), 1000)?;
    assert_eq!(stats.sample_records, 50);

    // The sample is the whole input, so the footprint is that of all records.
    let mut reader = CsvRecordReader::open(&path, &CsvOptions::default())?;
    let all = reader.read_batch(usize::MAX)?;
    let full = records_to_batch(reader.headers(), &all)?;
    assert_eq!(stats.footprint_bytes, full.get_array_memory_size());
    assert!((stats.avg_bytes_per_record - full.get_array_memory_size() as f64 / 50.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn sample_is_bounded() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(3000).write(tmp.path().join("big.csv"))?;

    let stats = sample_statistics(&path, &CsvOptions::default(), 1000)?;
    assert_eq!(stats.sample_records, 1000);
    assert!(stats.avg_bytes_per_record > 0.0);
    Ok(())
}

#[test]
fn wide_records_hit_the_floor() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let blob = "x".repeat(5_000);
    let fixture = (0..20).fold(CsvFixture::new(&["id", "blob"]), |f, i| {
        f.row(&[i.to_string(), blob.clone()])
    });
    let path = fixture.write(tmp.path().join("wide.csv"))?;

    let estimate = estimate_records_per_segment(&path, 1_000, &SplitOptions::default());
    match &estimate {
        Estimate::Measured { stats, .. } => assert!(stats.avg_bytes_per_record > 1_000.0),
        other => panic!("expected a measured estimate, got {other:?}"),
    }
    assert_eq!(estimate.records_per_segment(), 1000);
    Ok(())
}

#[test]
fn estimate_scales_with_budget() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(2000).write(tmp.path().join("rows.csv"))?;
    let options = SplitOptions::default();

    let stats = sample_statistics(&path, &options.csv, options.sample_records)?;
    let target = (10_000.0 * stats.avg_bytes_per_record + stats.avg_bytes_per_record / 2.0) as u64;

    let estimate = estimate_records_per_segment(&path, target, &options);
    assert!(!estimate.is_fallback());
    assert_eq!(estimate.records_per_segment(), 10_000);
    Ok(())
}

#[test]
fn missing_input_falls_back_to_default() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let estimate =
        estimate_records_per_segment(tmp.path().join("nope.csv"), 1 << 20, &SplitOptions::default());

    assert!(matches!(
        estimate,
        Estimate::Fallback {
            records_per_segment: 10_000,
            reason: EstimationError::Read(_),
        }
    ));
    Ok(())
}

#[test]
fn header_only_input_is_an_empty_sample() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::new(&["a", "b"]).write(tmp.path().join("header.csv"))?;

    let err = sample_statistics(&path, &CsvOptions::default(), 1000).unwrap_err();
    assert!(matches!(err, EstimationError::EmptySample { .. }));

    let options = SplitOptions {
        fallback_records_per_segment: 1234,
        ..SplitOptions::default()
    };
    assert_eq!(estimate_records_per_segment(&path, 1 << 20, &options).records_per_segment(), 1234);
    Ok(())
}

#[test]
fn empty_file_has_no_header() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("empty.csv");
    fs::write(&path, "")?;

    let err = sample_statistics(&path, &CsvOptions::default(), 1000).unwrap_err();
    assert!(matches!(
        err,
        EstimationError::Read(csv_splitter::ReadError::MissingHeader { .. })
    ));
    Ok(())
}

#[test]
fn malformed_lines_in_sample_are_skipped() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(10)
        .raw_line("1,2,3,4,5")
        .raw_line("lonely")
        .write(tmp.path().join("mixed.csv"))?;

    let stats = sample_statistics(&path, &CsvOptions::default(), 1000)?;
    assert_eq!(stats.sample_records, 10);
    Ok(())
}
