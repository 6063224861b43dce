use std::path::Path;

use anyhow::Context;

use crate::models::StudentInput;

/// One data row: the typed cells, or why the row could not be read.
pub type CsvRow = Result<StudentInput, String>;

/// Reads `name,math,english,science` rows. Cells are kept as typed text so each
/// row goes through the same validation as a manual add. A malformed row becomes
/// an `Err` entry; only an unreadable file or header fails the whole read.
pub fn read_csv(csv_path: &Path) -> anyhow::Result<Vec<CsvRow>> {
    let reader = csv_reader()
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_rows(reader)
}

fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(true);
    builder
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<CsvRow>> {
    reader.headers().context("failed to read csv header")?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<StudentInput>() {
        match result {
            Ok(input) => rows.push(Ok(input)),
            Err(err) if err.is_io_error() => {
                return Err(err).context("failed to read csv");
            }
            Err(err) => rows.push(Err(format!("malformed row: {err}"))),
        }
    }
    Ok(rows)
}

pub fn sample_roster() -> Vec<StudentInput> {
    vec![
        StudentInput::new("Avery Lee", "95", "88", "92"),
        StudentInput::new("Jules Moreno", "78", "84", "69"),
        StudentInput::new("Kiara Patel", "61", "57", "66"),
    ]
}
