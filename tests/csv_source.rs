use std::io::Write;

use decaymatch::pgarray::decode_array;
use decaymatch::source::{CsvSource, RecordSource, SourceOptions};
use decaymatch::{Error, source};
use tempfile::NamedTempFile;

fn write_fixture(contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn iterates_records_by_column_name() -> anyhow::Result<()> {
    let file = write_fixture("eid,mclen,extra\n10,3,x\n11,4,y\n")?;
    let mut src = CsvSource::open(file.path(), &["eid", "mclen"])?;

    assert!(src.next()?);
    assert_eq!(src.get("eid")?, "10");
    assert_eq!(src.get("mclen")?, "3");
    assert!(src.next()?);
    assert_eq!(src.get("eid")?, "11");
    assert!(!src.next()?);
    Ok(())
}

#[test]
fn unrequested_columns_are_unknown() -> anyhow::Result<()> {
    let file = write_fixture("eid,mclen,extra\n10,3,x\n")?;
    let mut src = CsvSource::open(file.path(), &["eid"])?;
    src.next()?;
    // `extra` exists in the file but was not part of the opened column set
    assert!(matches!(src.get("extra"), Err(Error::UnknownField(_))));
    assert!(matches!(src.get("nope"), Err(Error::UnknownField(_))));
    Ok(())
}

#[test]
fn missing_column_fails_at_open() -> anyhow::Result<()> {
    let file = write_fixture("eid,mclen\n10,3\n")?;
    assert!(matches!(
        CsvSource::open(file.path(), &["eid", "absent"]),
        Err(Error::UnknownField(_))
    ));
    Ok(())
}

#[test]
fn get_before_first_next_fails() -> anyhow::Result<()> {
    let file = write_fixture("eid\n10\n")?;
    let src = CsvSource::open(file.path(), &["eid"])?;
    assert!(matches!(src.get("eid"), Err(Error::Source(_))));
    Ok(())
}

#[test]
fn close_is_idempotent() -> anyhow::Result<()> {
    let file = write_fixture("eid\n10\n")?;
    let mut src = CsvSource::open(file.path(), &["eid"])?;
    src.close()?;
    src.close()?;
    assert!(!src.next()?);
    Ok(())
}

#[test]
fn quoted_array_fields_pass_through() -> anyhow::Result<()> {
    let file = write_fixture("eid,daulen\n10,\"{1,2,3}\"\n")?;
    let mut src = CsvSource::open(file.path(), &["eid", "daulen"])?;
    src.next()?;
    // the csv layer strips the quotes, the array decoder takes it from there
    assert_eq!(src.get("daulen")?, "{1,2,3}");
    assert_eq!(decode_array::<i32>(src.get("daulen")?)?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn empty_file_yields_no_records() -> anyhow::Result<()> {
    let file = write_fixture("eid,mclen\n")?;
    let mut src = CsvSource::open(file.path(), &["eid"])?;
    assert!(!src.next()?);
    Ok(())
}

#[test]
fn source_selection_requires_a_store() {
    let opts = SourceOptions::default();
    assert!(matches!(
        source::open(&opts, &["eid"]),
        Err(Error::Config(_))
    ));
}

#[test]
fn source_selection_prefers_csv() -> anyhow::Result<()> {
    let file = write_fixture("eid\n10\n")?;
    let opts = SourceOptions {
        input_csv: Some(file.path().to_path_buf()),
        dbname: Some("ignored".into()),
        table_name: Some("ignored".into()),
        cursor_fetch_size: 5000,
    };
    let mut src = source::open(&opts, &["eid"])?;
    assert!(src.next()?);
    assert_eq!(src.get("eid")?, "10");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn reads_gzipped_inputs() -> anyhow::Result<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("events.csv.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path)?, Compression::default());
    encoder.write_all(b"eid,mclen\n10,3\n")?;
    encoder.finish()?;

    let mut src = CsvSource::open(&path, &["eid", "mclen"])?;
    assert!(src.next()?);
    assert_eq!(src.get("mclen")?, "3");
    assert!(!src.next()?);
    Ok(())
}
