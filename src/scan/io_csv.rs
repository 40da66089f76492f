// Primitives for reading CSV files.

use crate::scan::{
    io_common::{find_column, make_default_id},
    *,
};

/// Reads the non-empty values of one column of a CSV file with a header row.
pub fn read_csv_text(path: &str, column: &str) -> ScanResult<Vec<Entry>> {
    let default_id = make_default_id(path);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_text: header: {:?}", header);
    let col_idx = find_column(&header, column)?;

    let mut res: Vec<Entry> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        match line.get(col_idx) {
            Some(s) if !s.trim().is_empty() => res.push(Entry {
                id: default_id(lineno),
                text: s.to_string(),
            }),
            _ => {
                debug!("read_csv_text: lineno {:?}: empty value, skipping", lineno);
            }
        }
    }
    info!("read_csv_text: {:?} entries in {:?}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_column() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("votes.csv");
        fs::write(
            &p,
            "id,text\n1,Noboa\n2,\n3,\"luisa, gonzález\"\n4\n5,nulo\n",
        )
        .unwrap();
        let entries = read_csv_text(p.to_str().unwrap(), "text").unwrap();
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Noboa", "luisa, gonzález", "nulo"]);
        assert_eq!(entries[2].id, "votes.csv-00000006");
    }

    #[test]
    fn missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("votes.csv");
        fs::write(&p, "id,comment\n1,Noboa\n").unwrap();
        assert!(matches!(
            read_csv_text(p.to_str().unwrap(), "text"),
            Err(ScanError::MissingTextColumn { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_text("/does/not/exist.csv", "text"),
            Err(ScanError::CsvOpen { .. })
        ));
    }
}
