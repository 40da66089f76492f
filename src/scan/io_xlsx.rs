// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::warn;

use crate::scan::{
    io_common::{find_column, make_default_id},
    *,
};

/// Reads the non-empty cells of one column of a workbook.
///
/// The first row of the worksheet is the header, and it must contain `column`.
pub fn read_excel_text(path: &str, worksheet: Option<&str>, column: &str) -> ScanResult<Vec<Entry>> {
    let default_id = make_default_id(path);
    let wrange = get_range(path, worksheet)?;

    // The range starts at the first used row, which is not always the first row of the sheet.
    let first_lineno = wrange.start().map(|(r, _)| r as usize).unwrap_or(0) + 1;
    let mut rows = wrange.rows();
    let header_row = rows.next().context(EmptyExcelSnafu { path })?;
    let mut header: Vec<String> = Vec::new();
    for cell in header_row.iter() {
        header.push(cell_to_text(cell, first_lineno)?.unwrap_or_default());
    }
    debug!("read_excel_text: header: {:?}", header);
    let col_idx = find_column(&header, column)?;

    let mut res: Vec<Entry> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = first_lineno + idx + 1;
        let text = match row.get(col_idx) {
            Some(cell) => cell_to_text(cell, lineno)?,
            None => None,
        };
        match text {
            Some(text) => res.push(Entry {
                id: default_id(lineno),
                text,
            }),
            None => {
                debug!("read_excel_text: lineno {:?}: empty cell, skipping", lineno);
            }
        }
    }
    info!("read_excel_text: {:?} entries in {:?}", res.len(), path);
    Ok(res)
}

/// The text of a cell, or None for an empty cell.
fn cell_to_text(cell: &DataType, lineno: usize) -> ScanResult<Option<String>> {
    match cell {
        DataType::String(s) if s.trim().is_empty() => Ok(None),
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Float(f) => Ok(Some(f.to_string())),
        DataType::Int(i) => Ok(Some(i.to_string())),
        DataType::Bool(b) => Ok(Some(b.to_string())),
        DataType::DateTime(f) => Ok(Some(match cell.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => f.to_string(),
        })),
        DataType::Error(e) => {
            warn!("Error value {} in the cell at line {}, kept as text", e, lineno);
            Ok(Some(e.to_string()))
        }
        DataType::Empty => Ok(None),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, worksheet: Option<&str>) -> ScanResult<Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet {
        workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })
    }
}
