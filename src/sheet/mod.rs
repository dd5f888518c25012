mod xlsx;

use std::collections::HashMap;

use crate::error::Error;
use crate::model::{Record, SheetFormat};

const DATE: &str = "Datum";
const RECEIPT_NUMBER: &str = "Broj primke";
const SUPPLIER: &str = "Dobavljač";
const INVOICE_NUMBER: &str = "Broj ulaznog računa";
const ITEM_CODE: &str = "Šifra artikla";
const ITEM_NAME: &str = "Naziv artikla";
const UNIT: &str = "Jmj.";
const QUANTITY: &str = "Količina (+)";
const UNIT_PRICE_EUR: &str = "Nabavna cijena (EUR)";
const PRICE_PER_UNIT: &str = "Nabavna cijena po kom.";
const TOTAL_PRICE: &str = "Nabavna cijena ukupni iznos";
const TOTAL_VALUE: &str = "Nabavna vrijednost";

/// Case-insensitive label → column mapping built from the source header row.
/// A missing label resolves to the empty string, never an error.
pub(crate) struct HeaderIndex {
    labels: Vec<String>,
    by_label: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(labels: Vec<String>) -> Self {
        let mut by_label = HashMap::new();
        for (i, label) in labels.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            by_label.entry(label.to_lowercase()).or_insert(i);
        }
        Self { labels, by_label }
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    fn get<'a>(&self, cells: &'a [String], label: &str) -> &'a str {
        self.by_label
            .get(&label.to_lowercase())
            .and_then(|&i| cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Materialize one Record from a row of already-trimmed cells. Cells
    /// beyond the row's end default to empty; extras carry every header
    /// column in source order.
    pub(crate) fn record(&self, cells: &[String]) -> Record {
        Record {
            date: self.get(cells, DATE).to_string(),
            receipt_number: self.get(cells, RECEIPT_NUMBER).to_string(),
            supplier: self.get(cells, SUPPLIER).to_string(),
            invoice_number: self.get(cells, INVOICE_NUMBER).to_string(),
            item_code: self.get(cells, ITEM_CODE).to_string(),
            item_name: self.get(cells, ITEM_NAME).to_string(),
            unit: self.get(cells, UNIT).to_string(),
            quantity: self.get(cells, QUANTITY).to_string(),
            unit_price_eur: self.get(cells, UNIT_PRICE_EUR).to_string(),
            price_per_unit: self.get(cells, PRICE_PER_UNIT).to_string(),
            total_price: self.get(cells, TOTAL_PRICE).to_string(),
            total_value: self.get(cells, TOTAL_VALUE).to_string(),
            extras: self
                .labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    (label.clone(), cells.get(i).cloned().unwrap_or_default())
                })
                .collect(),
        }
    }
}

/// Parse source bytes into the ordered Record sequence. Structural problems
/// (empty file, unreadable header) fail; malformed cells degrade to empty
/// strings.
pub fn parse_bytes(bytes: &[u8], format: SheetFormat) -> Result<Vec<Record>, Error> {
    match format {
        SheetFormat::Delimited => parse_delimited(bytes),
        SheetFormat::Workbook => xlsx::parse(bytes),
    }
}

fn parse_delimited(bytes: &[u8]) -> Result<Vec<Record>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = reader.records();

    let header_row = match rows.next() {
        Some(row) => row?,
        None => return Err(Error::InvalidSheet("empty file, no header row".into())),
    };
    let header = HeaderIndex::new(
        header_row.iter().map(|c| c.trim().to_string()).collect(),
    );

    let mut out = Vec::new();
    for row in rows {
        let row = row?;
        let cells: Vec<String> = row.iter().map(|c| c.trim().to_string()).collect();
        out.push(header.record(&cells));
    }
    log::debug!("delimited parse: {} data rows", out.len());
    Ok(out)
}
