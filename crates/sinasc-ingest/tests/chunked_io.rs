use std::fs;
use std::io::Write;
use std::path::PathBuf;

use polars::prelude::{AnyValue, DataType};
use sinasc_ingest::{ChunkOptions, ChunkReader, CleanedTableWriter, IngestError, read_table};
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    path
}

#[test]
fn chunks_are_bounded_and_cover_every_row() {
    let dir = TempDir::new().unwrap();
    let path = temp_file(
        &dir,
        "source.csv",
        b"CONTADOR;SEXO;IDADEMAE\n1;1;20\n2;2;31\n3;1;\n4;2;25\n5;1;19\n",
    );

    let reader = ChunkReader::open(&path, ChunkOptions::default().with_chunk_size(2)).unwrap();
    assert_eq!(reader.headers(), ["CONTADOR", "SEXO", "IDADEMAE"]);

    let heights: Vec<usize> = reader.map(|chunk| chunk.unwrap().height()).collect();
    assert_eq!(heights, vec![2, 2, 1]);
}

#[test]
fn missing_input_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let result = ChunkReader::open(dir.path().join("absent.csv"), ChunkOptions::default());
    assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
}

#[test]
fn empty_file_has_no_header() {
    let dir = TempDir::new().unwrap();
    let path = temp_file(&dir, "empty.csv", b"");
    let result = ChunkReader::open(&path, ChunkOptions::default());
    assert!(matches!(result, Err(IngestError::MissingHeader { .. })));
}

#[test]
fn latin1_text_and_short_records_are_tolerated() {
    let dir = TempDir::new().unwrap();
    let path = temp_file(&dir, "latin1.csv", b"UF;NOME;N\n35;S\xe3o Paulo;1\n12;Acre\n");

    let df = read_table(&path, ChunkOptions::default()).unwrap();
    assert_eq!(df.height(), 2);
    let nome = df.column("NOME").unwrap();
    assert_eq!(nome.get(0).unwrap(), AnyValue::String("São Paulo"));
    let n = df.column("N").unwrap();
    assert_eq!(n.dtype(), &DataType::Int64);
    assert_eq!(n.null_count(), 1);
}

#[test]
fn dtypes_are_inferred_per_column() {
    let dir = TempDir::new().unwrap();
    let path = temp_file(
        &dir,
        "types.csv",
        "\u{feff}A;B;C;D\n1;1.5;x;\n2;2;y;\n".as_bytes(),
    );

    let df = read_table(&path, ChunkOptions::default()).unwrap();
    assert_eq!(df.get_column_names()[0].as_str(), "A");
    assert_eq!(df.column("A").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("B").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("C").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("D").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("D").unwrap().null_count(), 2);
}

#[test]
fn header_only_file_reads_as_empty_frame() {
    let dir = TempDir::new().unwrap();
    let path = temp_file(&dir, "header.csv", b"A;B\n");
    let df = read_table(&path, ChunkOptions::default()).unwrap();
    assert_eq!(df.height(), 0);
    assert_eq!(df.width(), 2);
}

#[test]
fn writer_emits_header_once_and_aligns_later_chunks() {
    let dir = TempDir::new().unwrap();
    let source = temp_file(&dir, "source.csv", b"ID;A;B\n1;10;0.5\n2;20;1\n3;;2\n");
    let output = dir.path().join("out").join("cleaned.csv");

    let mut writer = CleanedTableWriter::new(&output);
    for chunk in ChunkReader::open(&source, ChunkOptions::default().with_chunk_size(2)).unwrap() {
        writer.append(&chunk.unwrap()).unwrap();
    }
    assert_eq!(writer.header().unwrap(), ["ID", "A", "B"]);
    assert_eq!(writer.finish().unwrap(), 3);

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text, "ID;A;B\n1;10;0.5\n2;20;1\n3;;2\n");
}

#[test]
fn writer_truncates_previous_output() {
    let dir = TempDir::new().unwrap();
    let output = temp_file(&dir, "cleaned.csv", b"stale;content\n9;9\n");
    let source = temp_file(&dir, "source.csv", b"X\n1\n");

    let mut writer = CleanedTableWriter::new(&output);
    let df = read_table(&source, ChunkOptions::default()).unwrap();
    writer.append(&df).unwrap();
    writer.finish().unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "X\n1\n");
}

#[test]
fn writer_without_chunks_creates_empty_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("cleaned.csv");
    let writer = CleanedTableWriter::new(&output);
    assert_eq!(writer.finish().unwrap(), 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}
