//! Word-document adapter backed by docx-rs.

use crate::adapters::FormatAdapter;
use crate::error::{ExtractError, ExtractResult};
use docfold_core::{SourceRef, TextUnit};
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use std::path::Path;
use tracing::debug;

const WORD_EXTENSIONS: &[&str] = &["docx", "doc"];

/// Adapter for Word documents.
///
/// Emits one unit per non-empty paragraph, then one unit per non-empty
/// table row (cells joined with " | "). Paragraph indices count every
/// paragraph in the document, including empty ones, so positions stay
/// stable when blank paragraphs are skipped.
#[derive(Default)]
pub struct WordAdapter;

impl WordAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for WordAdapter {
    fn produce_units(&self, path: &Path) -> ExtractResult<Vec<TextUnit>> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let buf = std::fs::read(path)?;
        let docx = read_docx(&buf).map_err(|e| ExtractError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut units = Vec::new();

        let mut paragraph_no = 0;
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(p) = child {
                let text = paragraph_text(p);
                if !text.trim().is_empty() {
                    units.push(TextUnit::new(
                        units.len(),
                        text,
                        SourceRef::Paragraph {
                            paragraph: paragraph_no,
                        },
                    ));
                }
                paragraph_no += 1;
            }
        }

        let mut table_no = 0;
        for child in &docx.document.children {
            if let DocumentChild::Table(t) = child {
                collect_table_rows(t, table_no, &mut units);
                table_no += 1;
            }
        }

        debug!(
            "extracted {} unit(s) from {} ({} paragraph(s), {} table(s))",
            units.len(),
            path.display(),
            paragraph_no,
            table_no
        );

        Ok(units)
    }

    fn extensions(&self) -> &[&str] {
        WORD_EXTENSIONS
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn collect_table_rows(table: &Table, table_no: usize, units: &mut Vec<TextUnit>) {
    for (row_no, row_child) in table.rows.iter().enumerate() {
        let TableChild::TableRow(row) = row_child;

        let cells: Vec<String> = row
            .cells
            .iter()
            .filter_map(|cell_child| {
                let TableRowChild::TableCell(cell) = cell_child;
                let text = cell
                    .children
                    .iter()
                    .filter_map(|content| match content {
                        TableCellContent::Paragraph(p) => {
                            let t = paragraph_text(p);
                            if t.trim().is_empty() {
                                None
                            } else {
                                Some(t)
                            }
                        }
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            })
            .collect();

        if cells.is_empty() {
            continue;
        }

        units.push(TextUnit::new(
            units.len(),
            cells.join(" | "),
            SourceRef::TableRow {
                table: table_no,
                row: row_no,
            },
        ));
    }
}
