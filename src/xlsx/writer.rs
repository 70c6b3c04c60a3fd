use crate::dedupe::{ConflictKind, DedupeReport};
use crate::error::Result;
use crate::model::Catalog;
use crate::quality::QualityReport;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Write the full audit workbook: catalog rows, quality scores, duplicates
pub fn write_audit_workbook(
    catalog: &Catalog,
    quality: &QualityReport,
    dedupe: &DedupeReport,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Catalog")?;
    write_catalog_sheet(sheet, catalog)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Quality")?;
    write_quality_sheet(sheet, quality)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Duplicates")?;
    write_duplicates_sheet(sheet, dedupe)?;

    workbook.save(path)?;
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin)
}

fn write_catalog_sheet(sheet: &mut Worksheet, catalog: &Catalog) -> Result<()> {
    let format = header_format();

    sheet.set_column_width(0, 6)?; // Row
    for (col, header) in catalog.headers.iter().enumerate() {
        let width = match header.as_str() {
            "Content" | "Description" => 40,
            "Snippet Name" => 18,
            _ => 14,
        };
        sheet.set_column_width(col as u16 + 1, width)?;
        sheet.write_string_with_format(0, col as u16 + 1, header, &format)?;
    }
    sheet.write_string_with_format(0, 0, "Row", &format)?;

    for (i, snippet) in catalog.rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, Catalog::row_number(i) as f64)?;
        for (col, header) in catalog.headers.iter().enumerate() {
            sheet.write_string(row, col as u16 + 1, snippet.get(header).unwrap_or_default())?;
        }
    }

    Ok(())
}

fn write_quality_sheet(sheet: &mut Worksheet, quality: &QualityReport) -> Result<()> {
    let format = header_format();
    sheet.set_column_width(0, 24)?;
    sheet.set_column_width(1, 12)?;
    sheet.set_column_width(2, 48)?;
    sheet.set_column_width(3, 48)?;

    sheet.write_string_with_format(0, 0, "Dimension", &format)?;
    sheet.write_string_with_format(0, 1, "Score", &format)?;

    let mut row = 1;
    for (dimension, score) in &quality.score.dimensions {
        sheet.write_string(row, 0, dimension)?;
        sheet.write_number(row, 1, (*score * 10.0).round() / 10.0)?;
        row += 1;
    }
    sheet.write_string(row, 0, "Overall")?;
    sheet.write_number(row, 1, (quality.score.overall * 10.0).round() / 10.0)?;
    sheet.write_string(row, 2, quality.score.grade.to_string())?;
    row += 2;

    sheet.write_string_with_format(row, 0, "Priority", &format)?;
    sheet.write_string_with_format(row, 2, "Issue", &format)?;
    sheet.write_string_with_format(row, 3, "Action", &format)?;
    row += 1;
    for rec in &quality.recommendations {
        sheet.write_string(row, 0, rec.priority.to_string())?;
        sheet.write_string(row, 2, &rec.issue)?;
        sheet.write_string(row, 3, &rec.action)?;
        row += 1;
    }

    Ok(())
}

fn write_duplicates_sheet(sheet: &mut Worksheet, dedupe: &DedupeReport) -> Result<()> {
    let format = header_format();
    sheet.set_column_width(0, 14)?;
    sheet.set_column_width(1, 8)?;
    sheet.set_column_width(2, 20)?;
    sheet.set_column_width(3, 8)?;
    sheet.set_column_width(4, 20)?;
    sheet.set_column_width(5, 44)?;

    let headers = ["Kind", "Row A", "Snippet A", "Row B", "Snippet B", "Detail"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }

    let mut row = 1;
    for group in &dedupe.exact {
        // One line per extra copy, anchored to the group's first member
        let (first_row, first_name) = &group.members[0];
        for (dup_row, dup_name) in &group.members[1..] {
            sheet.write_string(row, 0, "exact")?;
            sheet.write_number(row, 1, *first_row as f64)?;
            sheet.write_string(row, 2, first_name)?;
            sheet.write_number(row, 3, *dup_row as f64)?;
            sheet.write_string(row, 4, dup_name)?;
            sheet.write_string(row, 5, &group.content_preview)?;
            row += 1;
        }
    }

    for pair in &dedupe.similar {
        sheet.write_string(row, 0, "similar")?;
        sheet.write_number(row, 1, pair.row_a as f64)?;
        sheet.write_string(row, 2, &pair.name_a)?;
        sheet.write_number(row, 3, pair.row_b as f64)?;
        sheet.write_string(row, 4, &pair.name_b)?;
        sheet.write_string(row, 5, format!("{}% similar", pair.score))?;
        row += 1;
    }

    for conflict in &dedupe.conflicts {
        let kind = match conflict.kind {
            ConflictKind::NameAndContent => "name+content",
            ConflictKind::NameOnly => "name conflict",
        };
        let (first_row, _) = &conflict.members[0];
        for (dup_row, preview) in &conflict.members[1..] {
            sheet.write_string(row, 0, kind)?;
            sheet.write_number(row, 1, *first_row as f64)?;
            sheet.write_string(row, 2, &conflict.name)?;
            sheet.write_number(row, 3, *dup_row as f64)?;
            sheet.write_string(row, 4, &conflict.name)?;
            sheet.write_string(row, 5, preview)?;
            row += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedupe::{self, DedupeConfig};
    use crate::model::Snippet;

    #[test]
    fn test_write_audit_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.xlsx");

        let catalog = Catalog::with_rows(vec![
            Snippet::new("omw", "on my way").with_language("English"),
            Snippet::new("omw2", "on my way"),
            Snippet::new("omw3", "on my way!"),
        ]);
        let quality = QualityReport::analyze(&catalog);
        let report = dedupe::analyze(&catalog, &DedupeConfig::default());

        write_audit_workbook(&catalog, &quality, &report, &path).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0);
    }

    #[test]
    fn test_empty_catalog_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let catalog = Catalog::new();
        let quality = QualityReport::analyze(&catalog);
        let report = dedupe::analyze(&catalog, &DedupeConfig::default());
        write_audit_workbook(&catalog, &quality, &report, &path).unwrap();
        assert!(path.exists());
    }
}
