#[cfg(any(feature = "compression-gzip", feature = "compression-zstd"))]
mod compression_tests {
    use anyhow::Result;
    use csv_splitter::testing::{CsvFixture, numbered_row, read_rows};
    use csv_splitter::{ConversionRequest, CsvOptions, NoProgress, SplitOptions, count_records, split_file};
    use std::io::Write;
    use std::path::Path;

    fn split_and_collect(input: &Path, out: &Path) -> Result<Vec<Vec<String>>> {
        // A budget of one byte pins segments to the record floor.
        let options = SplitOptions {
            min_records_per_segment: 40,
            ..SplitOptions::default()
        };
        let request = ConversionRequest::new(input, out, 1)?;
        let result = split_file(&request, &options, &mut NoProgress)?;
        assert!(result.segments.iter().all(|s| s.records <= 40));
        Ok(result
            .paths()
            .map(read_rows)
            .collect::<Result<Vec<_>>>()?
            .concat())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_input_is_read_transparently() -> Result<()> {
        use flate2::{Compression, write::GzEncoder};

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("data.csv.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&path)?, Compression::default());
        enc.write_all(CsvFixture::numbered(120).to_csv_string().as_bytes())?;
        enc.finish()?;

        assert_eq!(count_records(&path, &CsvOptions::default(), 50)?, 120);
        let rows = split_and_collect(&path, &tmp.path().join("out"))?;
        assert_eq!(rows, (0..120).map(numbered_row).collect::<Vec<_>>());
        Ok(())
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_input_is_read_transparently() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("data.csv.zst");
        let bytes = zstd::stream::encode_all(CsvFixture::numbered(75).to_csv_string().as_bytes(), 3)?;
        std::fs::write(&path, bytes)?;

        let rows = split_and_collect(&path, &tmp.path().join("out"))?;
        assert_eq!(rows.len(), 75);
        assert_eq!(rows[74], numbered_row(74));
        Ok(())
    }
}
