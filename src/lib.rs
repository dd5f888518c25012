mod error;
mod fonts;
pub mod format;
mod model;
mod pdf;
mod sheet;

pub use error::Error;
pub use fonts::FontMetrics;
pub use model::{Record, RenderConfig, SheetFormat};
pub use pdf::layout::{height_for, wrap_text};
pub use sheet::parse_bytes;

use std::path::Path;
use std::time::Instant;

/// Read a spreadsheet, keep the rows of one receipt, and write them as a
/// paginated PDF. The input format is chosen from the file name suffix.
pub fn generate_pdf(
    input: &Path,
    receipt_number: &str,
    output: &Path,
    config: &RenderConfig,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let format = SheetFormat::from_name(name);
    let t_read = t0.elapsed();

    let pdf = generate_pdf_bytes(&bytes, format, receipt_number, config)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &pdf).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_render - t_read).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        pdf.len(),
    );

    Ok(())
}

/// The core pipeline on in-memory bytes: parse, filter by exact
/// receipt-number equality, render. Fails before any layout work when the
/// sheet is structurally unusable or the filter matches nothing.
pub fn generate_pdf_bytes(
    input: &[u8],
    format: SheetFormat,
    receipt_number: &str,
    config: &RenderConfig,
) -> Result<Vec<u8>, Error> {
    let rows = sheet::parse_bytes(input, format)?;
    let total = rows.len();
    let selected: Vec<Record> = rows
        .into_iter()
        .filter(|r| r.receipt_number == receipt_number)
        .collect();
    log::info!(
        "Receipt {receipt_number}: {} of {total} rows selected",
        selected.len(),
    );
    if selected.is_empty() {
        return Err(Error::NoMatchingRows(receipt_number.to_string()));
    }
    pdf::render(&selected, receipt_number, config)
}
