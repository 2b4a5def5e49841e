//! Spreadsheet adapter backed by calamine.

use crate::adapters::FormatAdapter;
use crate::error::{ExtractError, ExtractResult};
use calamine::{open_workbook_auto, Data, Reader};
use docfold_core::{SourceRef, TextUnit};
use std::path::Path;
use tracing::debug;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];

/// Adapter for Excel workbooks; one unit per non-blank row.
///
/// Walks every sheet by default, or a single named sheet when set. Cell
/// values in a row are joined with a single space; blank cells and fully
/// blank rows are dropped.
#[derive(Default)]
pub struct SpreadsheetAdapter {
    sheet: Option<String>,
}

impl SpreadsheetAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict extraction to one sheet by name.
    pub fn with_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
        }
    }

    /// Sheet names and per-sheet row counts, without extracting units.
    pub fn workbook_summary(path: &Path) -> ExtractResult<Vec<(String, usize)>> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| ExtractError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut summary = Vec::new();
        for name in workbook.sheet_names().to_owned() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ExtractError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            summary.push((name, range.height()));
        }

        Ok(summary)
    }
}

impl FormatAdapter for SpreadsheetAdapter {
    fn produce_units(&self, path: &Path) -> ExtractResult<Vec<TextUnit>> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| ExtractError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let sheet_names: Vec<String> = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(ExtractError::Parse {
                        path: path.to_path_buf(),
                        message: format!("sheet not found: {}", name),
                    });
                }
                vec![name.clone()]
            }
            None => workbook.sheet_names().to_owned(),
        };

        let mut units = Vec::new();
        for name in sheet_names {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ExtractError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;

            for (row_no, row) in range.rows().enumerate() {
                let cells: Vec<String> = row.iter().filter_map(cell_to_string).collect();
                if cells.is_empty() {
                    continue;
                }
                units.push(TextUnit::new(
                    units.len(),
                    cells.join(" "),
                    SourceRef::Row {
                        sheet: name.clone(),
                        row: row_no,
                    },
                ));
            }
            debug!("extracted sheet '{}' from {}", name, path.display());
        }

        Ok(units)
    }

    fn extensions(&self) -> &[&str] {
        SPREADSHEET_EXTENSIONS
    }
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    // Rows 1 and 3 have inline-string cells; row 2 is entirely empty
    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>a</t></is></c><c r="B1" t="inlineStr"><is><t>b</t></is></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>c</t></is></c></row>
</sheetData>
</worksheet>"#;

    fn write_xlsx(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let opts = SimpleFileOptions::default();

        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET),
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_rows_join_cells_and_skip_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_xlsx(&path);

        let units = SpreadsheetAdapter::new().produce_units(&path).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "a b");
        assert_eq!(
            units[0].source_ref,
            SourceRef::Row {
                sheet: "Sheet1".to_string(),
                row: 0
            }
        );
        assert_eq!(units[1].text, "c");
        assert_eq!(
            units[1].source_ref,
            SourceRef::Row {
                sheet: "Sheet1".to_string(),
                row: 2
            }
        );
    }

    #[test]
    fn test_sheet_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_xlsx(&path);

        let units = SpreadsheetAdapter::with_sheet("Sheet1")
            .produce_units(&path)
            .unwrap();
        assert_eq!(units.len(), 2);

        let err = SpreadsheetAdapter::with_sheet("Budget")
            .produce_units(&path)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));
    }

    #[test]
    fn test_workbook_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_xlsx(&path);

        let summary = SpreadsheetAdapter::workbook_summary(&path).unwrap();
        assert_eq!(summary, vec![("Sheet1".to_string(), 3)]);
    }

    #[test]
    fn test_missing_file() {
        let err = SpreadsheetAdapter::new()
            .produce_units(Path::new("/no/such/book.xlsx"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn test_garbage_bytes_are_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.xlsx");
        std::fs::write(&path, b"this is not a workbook").unwrap();

        let err = SpreadsheetAdapter::new().produce_units(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(cell_to_string(&Data::Empty), None);
        assert_eq!(cell_to_string(&Data::String("  ".to_string())), None);
        assert_eq!(
            cell_to_string(&Data::String(" a ".to_string())),
            Some("a".to_string())
        );
        assert_eq!(cell_to_string(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_to_string(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_to_string(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn test_supports_extensions() {
        let adapter = SpreadsheetAdapter::new();
        assert!(adapter.supports("xlsx"));
        assert!(adapter.supports("XLS"));
        assert!(!adapter.supports("docx"));
    }
}
