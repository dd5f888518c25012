/// One parsed goods-receipt line item. All fields hold the unformatted
/// display text from the source cell (trimmed, never coerced to numbers at
/// parse time) so that original formatting survives and non-numeric values
/// pass through unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub date: String,
    pub receipt_number: String,
    pub supplier: String,
    pub invoice_number: String,
    pub item_code: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: String,
    pub unit_price_eur: String,
    pub price_per_unit: String,
    pub total_price: String,
    pub total_value: String,
    /// Every source column, keyed by its literal header text, in source
    /// column order. Unknown columns survive a parse/render round trip here.
    pub extras: Vec<(String, String)>,
}

impl Record {
    /// Exact-key lookup into the extras list (first match wins).
    pub fn extra(&self, label: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Input format, chosen from the declared file name — not sniffed from
/// content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetFormat {
    Delimited,
    Workbook,
}

impl SheetFormat {
    pub fn from_name(name: &str) -> Self {
        if name.to_lowercase().ends_with(".xlsx") {
            SheetFormat::Workbook
        } else {
            SheetFormat::Delimited
        }
    }
}

/// Render-time configuration. Geometry and typefaces are inputs, not core
/// constants; the defaults reproduce the landscape page the original report
/// used.
pub struct RenderConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub company_name: String,
    pub address_lines: Vec<String>,
    /// Raw TTF bytes for the regular typeface; built-in Helvetica metrics
    /// are used when absent.
    pub regular_font: Option<Vec<u8>>,
    /// Raw TTF bytes for the bold typeface; built-in Helvetica-Bold when
    /// absent.
    pub bold_font: Option<Vec<u8>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width: 842.0,
            page_height: 595.0,
            margin: 24.0,
            company_name: "Metrax d.o.o.".to_string(),
            address_lines: vec![
                "Ivana Nepomuka Jemeršića 37D".to_string(),
                "43290 Grubišno Polje".to_string(),
            ],
            regular_font: None,
            bold_font: None,
        }
    }
}
