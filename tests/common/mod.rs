#![allow(dead_code)]

use std::io::Write;

use zip::write::SimpleFileOptions;

/// The canonical header row, in source column order.
pub const HEADER: &str = "Datum,Broj primke,Dobavljač,Broj ulaznog računa,Šifra artikla,Naziv artikla,Jmj.,Količina (+),Nabavna cijena (EUR),Nabavna cijena po kom.,Nabavna cijena ukupni iznos,Nabavna vrijednost";

/// One CSV data line for a receipt. Field order matches `HEADER`; every
/// field is quoted so comma decimals stay inside their cell.
pub fn csv_row(
    receipt: &str,
    item_code: &str,
    item_name: &str,
    unit: &str,
    quantity: &str,
    price_per_unit: &str,
    total_price: &str,
    total_value: &str,
) -> String {
    [
        "01.02.2024.",
        receipt,
        "Dobavljač d.o.o.",
        "123/2024",
        item_code,
        item_name,
        unit,
        quantity,
        "1.00",
        price_per_unit,
        total_price,
        total_value,
    ]
    .map(|cell| format!("\"{cell}\""))
    .join(",")
}

pub fn csv_bytes(rows: &[String]) -> Vec<u8> {
    let mut out = String::from(HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out.into_bytes()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Column index to reference letters: 0 → A, 25 → Z, 26 → AA.
fn col_letters(mut index: usize) -> String {
    let mut s = String::new();
    loop {
        s.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    s
}

/// A worksheet XML with every cell as an inline string.
pub fn inline_sheet_xml(rows: &[Vec<&str>]) -> String {
    let mut data = String::new();
    for (ri, row) in rows.iter().enumerate() {
        data.push_str(&format!("<row r=\"{}\">", ri + 1));
        for (ci, cell) in row.iter().enumerate() {
            data.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                col_letters(ci),
                ri + 1,
                xml_escape(cell)
            ));
        }
        data.push_str("</row>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>{data}</sheetData></worksheet>"
    )
}

/// Assemble a minimal XLSX container around a worksheet part.
pub fn xlsx_with_parts(sheet_xml: &str, shared_strings_xml: Option<&str>) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    zip.start_file("xl/workbook.xml", opts).unwrap();
    zip.write_all(
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
          <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
          xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
          <sheets><sheet name=\"Primke\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>",
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
    zip.write_all(
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
          <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
          <Relationship Id=\"rId1\" \
          Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" \
          Target=\"worksheets/sheet1.xml\"/></Relationships>",
    )
    .unwrap();

    if let Some(sst) = shared_strings_xml {
        zip.start_file("xl/sharedStrings.xml", opts).unwrap();
        zip.write_all(sst.as_bytes()).unwrap();
    }

    zip.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
    zip.write_all(sheet_xml.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

pub fn xlsx_inline(rows: &[Vec<&str>]) -> Vec<u8> {
    xlsx_with_parts(&inline_sheet_xml(rows), None)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Pages in a generated document: one MediaBox is written per page.
pub fn page_count(pdf: &[u8]) -> usize {
    let mut count = 0;
    let mut rest = pdf;
    while let Some(pos) = find(rest, b"/MediaBox") {
        count += 1;
        rest = &rest[pos + 9..];
    }
    count
}

/// All inflated content-stream bytes of a generated document, lossily
/// decoded. Literal show strings like `(UKUPNO)` stay searchable.
pub fn content_text(pdf: &[u8]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while let Some(rel) = find(&pdf[i..], b"stream") {
        let pos = i + rel;
        if pos >= 3 && &pdf[pos - 3..pos] == b"end" {
            i = pos + 6;
            continue;
        }
        let mut start = pos + 6;
        if pdf.get(start) == Some(&b'\r') {
            start += 1;
        }
        if pdf.get(start) == Some(&b'\n') {
            start += 1;
        }
        let Some(end_rel) = find(&pdf[start..], b"endstream") else {
            break;
        };
        let mut end = start + end_rel;
        while end > start && (pdf[end - 1] == b'\n' || pdf[end - 1] == b'\r') {
            end -= 1;
        }
        if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[start..end]) {
            out.push_str(&String::from_utf8_lossy(&raw));
        }
        i = start + end_rel + 9;
    }
    out
}
