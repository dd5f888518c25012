use std::io::{Cursor, Read};

use super::HeaderIndex;
use crate::error::Error;
use crate::model::Record;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

type Zip<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

fn sml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(MAIN_NS))
}

fn read_archive_text(zip: &mut Zip, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Parse the first worksheet of an XLSX workbook into Records. Only the
/// first sheet is read; the header row is the sheet's first row and its
/// populated cell count fixes the column span for every data row.
pub(super) fn parse(bytes: &[u8]) -> Result<Vec<Record>, Error> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|_| Error::InvalidSheet("file is not a ZIP archive".into()))?;

    let shared = parse_shared_strings(&mut zip)?;
    let sheet_path = first_sheet_path(&mut zip);

    let mut xml_content = String::new();
    zip.by_name(&sheet_path)
        .map_err(|_| {
            Error::InvalidSheet(format!("missing {sheet_path} (is this an XLSX file?)"))
        })?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let sheet_data = sml(xml.root_element(), "sheetData")
        .ok_or_else(|| Error::InvalidSheet("missing sheetData element".into()))?;

    let mut row_nodes = sheet_data.children().filter(|n| {
        n.tag_name().name() == "row" && n.tag_name().namespace() == Some(MAIN_NS)
    });

    let header_row = row_nodes
        .next()
        .ok_or_else(|| Error::InvalidSheet("empty sheet, no header row".into()))?;
    let header_cells = sparse_cells(header_row, &shared);
    let span = header_cells.iter().map(|&(i, _)| i + 1).max().unwrap_or(0);
    if span == 0 {
        return Err(Error::InvalidSheet("empty header row".into()));
    }

    let mut labels = vec![String::new(); span];
    for (i, text) in header_cells {
        labels[i] = text.trim().to_string();
    }
    let header = HeaderIndex::new(labels);

    let mut out = Vec::new();
    for row in row_nodes {
        let mut cells = vec![String::new(); header.len()];
        for (i, text) in sparse_cells(row, &shared) {
            if i < cells.len() {
                cells[i] = text;
            }
        }
        out.push(header.record(&cells));
    }
    log::debug!("workbook parse: {} data rows from {sheet_path}", out.len());
    Ok(out)
}

/// Cells of one row as (column index, trimmed display text). Cells missing
/// a reference attribute take the next sequential column.
fn sparse_cells(row: roxmltree::Node, shared: &[String]) -> Vec<(usize, String)> {
    let mut cells = Vec::new();
    let mut next_col = 0usize;
    for c in row
        .children()
        .filter(|n| n.tag_name().name() == "c" && n.tag_name().namespace() == Some(MAIN_NS))
    {
        let col = c
            .attribute("r")
            .and_then(column_index)
            .unwrap_or(next_col);
        next_col = col + 1;
        cells.push((col, cell_text(c, shared)));
    }
    cells
}

/// Typed-aware cell conversion: integral numerics become plain integer
/// strings, fractional ones use the default float display, booleans render
/// as true/false, strings are trimmed, anything else falls back to the raw
/// cell text.
fn cell_text(c: roxmltree::Node, shared: &[String]) -> String {
    let v_text = || {
        sml(c, "v")
            .and_then(|v| v.text())
            .unwrap_or("")
            .to_string()
    };
    match c.attribute("t").unwrap_or("n") {
        "s" => v_text()
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        "inlineStr" => sml(c, "is")
            .map(|is| collect_t_text(is).trim().to_string())
            .unwrap_or_default(),
        "b" => {
            if v_text().trim() == "1" {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        "str" => v_text().trim().to_string(),
        _ => {
            let raw = v_text();
            match raw.trim().parse::<f64>() {
                // Integral values print without a fractional part; 2^53
                // bounds the range where f64 holds exact integers.
                Ok(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                    (n as i64).to_string()
                }
                Ok(n) => format!("{n}"),
                Err(_) => raw.trim().to_string(),
            }
        }
    }
}

/// Concatenated text of every `t` descendant (plain and rich-text runs).
fn collect_t_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.tag_name().name() == "t" && n.tag_name().namespace() == Some(MAIN_NS))
        .filter_map(|n| n.text())
        .collect()
}

fn parse_shared_strings(zip: &mut Zip) -> Result<Vec<String>, Error> {
    let Some(content) = read_archive_text(zip, "xl/sharedStrings.xml") else {
        return Ok(Vec::new());
    };
    let xml = roxmltree::Document::parse(&content)?;
    Ok(xml
        .root_element()
        .children()
        .filter(|n| n.tag_name().name() == "si" && n.tag_name().namespace() == Some(MAIN_NS))
        .map(collect_t_text)
        .collect())
}

/// Resolve the first sheet listed in workbook.xml through the workbook rels
/// to its part name. Falls back to the conventional sheet1 path.
fn first_sheet_path(zip: &mut Zip) -> String {
    let fallback = || "xl/worksheets/sheet1.xml".to_string();

    let Some(workbook) = read_archive_text(zip, "xl/workbook.xml") else {
        return fallback();
    };
    let Ok(xml) = roxmltree::Document::parse(&workbook) else {
        return fallback();
    };
    let Some(rid) = xml
        .descendants()
        .find(|n| n.has_tag_name((MAIN_NS, "sheet")))
        .and_then(|n| n.attribute((REL_NS, "id")))
    else {
        return fallback();
    };

    let Some(rels) = read_archive_text(zip, "xl/_rels/workbook.xml.rels") else {
        return fallback();
    };
    let Ok(rels_xml) = roxmltree::Document::parse(&rels) else {
        return fallback();
    };
    rels_xml
        .descendants()
        .find(|n| n.tag_name().name() == "Relationship" && n.attribute("Id") == Some(rid))
        .and_then(|n| n.attribute("Target"))
        .map(|target| match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{target}"),
        })
        .unwrap_or_else(fallback)
}

/// Column index from a cell reference: "A1" → 0, "B7" → 1, "AA3" → 26.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<char> = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for ch in letters {
        index = index * 26 + (ch.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}
