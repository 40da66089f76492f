use std::path::Path;

use crate::scan::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Ids are made of the file name and the line number in the file (the header is line 1).
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Finds the position of a column, given its name in the header.
pub fn find_column(header: &[String], column: &str) -> ScanResult<usize> {
    let col_idx = header.iter().position(|h| h.trim() == column.trim());
    debug!("find_column: {:?} in {:?}: {:?}", column, header, col_idx);
    col_idx.context(MissingTextColumnSnafu {
        column,
        header: header.to_vec(),
    })
}
