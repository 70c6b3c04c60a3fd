use crate::error::{Result, SnippetError};
use crate::model::{Catalog, Snippet};
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;

/// Read a catalog from CSV content
///
/// Columns are matched by header name, not position. Known columns land in
/// the snippet fields; anything else is kept in the row's extras. The header
/// order is recorded on the catalog so a later save reproduces the layout.
pub fn read_catalog<R: Read>(reader: R) -> Result<Catalog> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(SnippetError::Catalog("catalog has no header row".into()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut snippet = Snippet::default();
        for (i, header) in headers.iter().enumerate() {
            if let Some(value) = record.get(i) {
                snippet.set(header, value);
            }
        }
        rows.push(snippet);
    }

    Ok(Catalog { rows, headers })
}

/// Read a catalog from a CSV file
pub fn read_catalog_file(path: &Path) -> Result<Catalog> {
    let file = std::fs::File::open(path)?;
    read_catalog(file)
}

/// Write a catalog as CSV, preserving the loaded column order
///
/// When rows carry categories but the catalog was loaded without the
/// category columns, the columns are appended so nothing is dropped.
pub fn write_catalog<W: Write>(catalog: &Catalog, writer: W) -> Result<()> {
    let mut headers = catalog.headers.clone();

    let any_categorized = catalog.rows.iter().any(|r| !r.main_category.is_empty());
    if any_categorized {
        for col in crate::model::CATEGORY_COLUMNS {
            if !headers.iter().any(|h| h == col) {
                headers.push(col.to_string());
            }
        }
    }

    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&headers)?;
    for row in &catalog.rows {
        let record: Vec<&str> = headers
            .iter()
            .map(|h| row.get(h).unwrap_or_default())
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a catalog to a CSV file
pub fn write_catalog_file(catalog: &Catalog, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_catalog(catalog, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{COL_MAIN_CATEGORY, COL_NAME};

    const SAMPLE: &str = "\
Snippet Name,Content,Application,Description,Language,Tags
omw,on my way,,quick reply,English,\"greeting, casual\"
arrow,\u{2192},,right arrow,,symbols
";

    #[test]
    fn test_read_catalog() {
        let catalog = read_catalog(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.headers.len(), 6);
        assert_eq!(catalog.rows[0].name, "omw");
        assert_eq!(catalog.rows[0].tag_list(), vec!["greeting", "casual"]);
        assert_eq!(catalog.rows[1].content, "\u{2192}");
        assert!(!catalog.has_column(COL_MAIN_CATEGORY));
    }

    #[test]
    fn test_read_catalog_with_extra_column() {
        let data = "Snippet Name,Content,Platform\nsig,Best regards,macOS\n";
        let catalog = read_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.rows[0].get("Platform"), Some("macOS"));
        assert_eq!(catalog.headers, vec!["Snippet Name", "Content", "Platform"]);
    }

    #[test]
    fn test_round_trip_preserves_layout() {
        let catalog = read_catalog(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();
        let reread = read_catalog(out.as_slice()).unwrap();
        assert_eq!(reread.headers, catalog.headers);
        assert_eq!(reread.rows, catalog.rows);
    }

    #[test]
    fn test_write_appends_category_columns() {
        let mut catalog = read_catalog(SAMPLE.as_bytes()).unwrap();
        catalog.rows[0].main_category = "Communication & Greetings".to_string();
        catalog.rows[0].subcategory = "Greetings".to_string();

        let mut out = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();
        let reread = read_catalog(out.as_slice()).unwrap();
        assert!(reread.has_column(COL_MAIN_CATEGORY));
        assert_eq!(reread.rows[0].main_category, "Communication & Greetings");
        assert_eq!(reread.rows[1].main_category, "");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");

        let catalog = read_catalog(SAMPLE.as_bytes()).unwrap();
        write_catalog_file(&catalog, &path).unwrap();
        let reread = read_catalog_file(&path).unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread.rows[0].get(COL_NAME), Some("omw"));
    }
}
