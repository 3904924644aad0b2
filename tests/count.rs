use anyhow::Result;
use csv_splitter::testing::CsvFixture;
use csv_splitter::{CsvOptions, RecordTotal, count_records};

#[test]
fn counts_all_records_across_windows() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let fixture = CsvFixture::numbered(2_345);
    assert_eq!(fixture.len(), 2_345);
    let path = fixture.write(tmp.path().join("rows.csv"))?;

    // Window size does not change the total.
    for window in [1, 7, 1000, 10_000] {
        assert_eq!(count_records(&path, &CsvOptions::default(), window)?, 2_345);
    }
    Ok(())
}

#[test]
fn malformed_records_are_not_counted() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = CsvFixture::numbered(3)
        .raw_line("too,many,fields,here")
        .row(&["3", "name_3", "3.5"])
        .raw_line("short")
        .write(tmp.path().join("mixed.csv"))?;

    assert_eq!(count_records(&path, &CsvOptions::default(), 2)?, 4);
    Ok(())
}

#[test]
fn header_only_counts_zero() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let fixture = CsvFixture::new(&["a"]);
    assert!(fixture.is_empty());
    let path = fixture.write(tmp.path().join("h.csv"))?;
    assert_eq!(count_records(&path, &CsvOptions::default(), 10)?, 0);
    Ok(())
}

#[test]
fn unreadable_input_yields_unknown_total() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let total = RecordTotal::from(count_records(
        tmp.path().join("missing.csv"),
        &CsvOptions::default(),
        10,
    ));
    assert!(matches!(total, RecordTotal::Unknown(_)));
    assert_eq!(total.known(), None);
    Ok(())
}

#[test]
fn custom_delimiter() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("semi.csv");
    std::fs::write(&path, "a;b\n1;2\n3;4\n5,6\n")?;

    let csv = CsvOptions {
        delimiter: b';',
        ..CsvOptions::default()
    };
    // "5,6" is a single field under `;` and therefore malformed.
    assert_eq!(count_records(&path, &csv, 10)?, 2);
    Ok(())
}
