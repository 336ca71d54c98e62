use csv::{ReaderBuilder, StringRecord, Trim};

use super::ImportError;
use crate::db::introspect::TableInfo;
use crate::db::value::SqlValue;

/// Parse CSV into the column list and rows for `table`.
///
/// With a header, only header cells naming a table column are kept. Without
/// one, cells map positionally onto the table's columns, skipping generated
/// keys. Short rows pad with NULL.
pub fn read_csv(
    input: &[u8],
    has_header: bool,
    table: &TableInfo,
) -> Result<(Vec<String>, Vec<Vec<SqlValue>>), ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let (columns, positions): (Vec<String>, Vec<usize>) = if has_header {
        reader
            .headers()?
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| table.column(name).map(|c| (c.name.clone(), idx)))
            .unzip()
    } else {
        let width = records.iter().map(StringRecord::len).max().unwrap_or(0);
        table
            .columns
            .iter()
            .filter(|c| !c.is_auto_increment())
            .take(width)
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .unzip()
    };

    let rows = records
        .iter()
        .map(|record| {
            positions
                .iter()
                .map(|&idx| record.get(idx).map(SqlValue::from_csv_cell).unwrap_or(SqlValue::Null))
                .collect()
        })
        .collect();

    Ok((columns, rows))
}
