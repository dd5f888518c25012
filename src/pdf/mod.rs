pub(crate) mod layout;

use std::collections::HashSet;
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::{FontEntry, register_face};
use crate::format::{fixed2, format_fixed2, format_integer, normalize_number};
use crate::model::{Record, RenderConfig};

use layout::{HAlign, draw_line, draw_wrapped, height_for, wrap_text};

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 9.5;
const LINE_H: f32 = 10.0;
const MIN_ROW_H: f32 = 22.0;
const HEADER_ROW_H: f32 = 20.0;
const CELL_PAD: f32 = 4.0;
const TOP_MARGIN: f32 = 40.0;
// Bottom reserves: rows keep more clearance than the closing totals row.
const ROW_RESERVE: f32 = 30.0;
const TOTALS_RESERVE: f32 = 20.0;
const META_SUPPLIER_W: f32 = 360.0;
const META_INVOICE_W: f32 = 300.0;

/// Fixed column layout: label and fraction of the usable page width.
const COLUMNS: [(&str, f32); 6] = [
    ("Šifra artikla", 0.09),
    ("Naziv artikla", 0.40),
    ("Jmj./Nab. po kom.", 0.17),
    ("Količina", 0.08),
    ("Nab. ukupno", 0.13),
    ("Nab. vrijednost", 0.13),
];

/// Numeric-ish columns are flush right; text columns flush left.
const RIGHT_ALIGNED: [bool; 6] = [true, false, false, true, true, true];

const META_LABELS: [&str; 4] = ["Datum:", "Broj primke:", "Dobavljač:", "Broj ulaznog računa:"];

pub(crate) struct Fonts {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

/// The six display values of one table row, in column order.
fn display_cells(r: &Record) -> [String; 6] {
    [
        format_integer(&r.item_code),
        r.item_name.clone(),
        format!("{} / {}", r.unit, format_fixed2(&r.price_per_unit)),
        format_integer(&r.quantity),
        format_fixed2(&r.total_price),
        format_fixed2(&r.total_value),
    ]
}

/// Page state threaded through layout. `y` is the cursor measured from the
/// page top (converted to PDF coordinates only when drawing); finalized
/// pages are never revisited.
struct PageBuilder<'a> {
    cfg: &'a RenderConfig,
    fonts: &'a Fonts,
    first: &'a Record,
    receipt_display: String,
    title: String,
    col_widths: Vec<f32>,
    contents: Vec<Content>,
    content: Content,
    y: f32,
}

impl PageBuilder<'_> {
    /// Draw the repeating page header — company block, centered title,
    /// metadata, bounded column labels — and leave the cursor below it.
    fn start_page(&mut self) {
        let left = self.cfg.margin;
        let ph = self.cfg.page_height;
        let mut y = TOP_MARGIN;

        draw_line(
            &mut self.content,
            &self.fonts.bold,
            &self.cfg.company_name,
            left,
            ph - y,
            TITLE_SIZE,
        );
        y += 12.0;
        for line in &self.cfg.address_lines {
            draw_line(&mut self.content, &self.fonts.regular, line, left, ph - y, BODY_SIZE);
            y += 12.0;
        }
        y += 4.0;

        let title_w = self.fonts.bold.metrics.text_width(&self.title, BODY_SIZE);
        draw_line(
            &mut self.content,
            &self.fonts.bold,
            &self.title,
            (self.cfg.page_width - title_w) / 2.0,
            ph - y,
            BODY_SIZE,
        );
        y += 14.0;

        draw_line(&mut self.content, &self.fonts.bold, META_LABELS[0], left, ph - y, BODY_SIZE);
        draw_line(
            &mut self.content,
            &self.fonts.regular,
            &self.first.date,
            left + 60.0,
            ph - y,
            BODY_SIZE,
        );
        y += 12.0;

        draw_line(&mut self.content, &self.fonts.bold, META_LABELS[1], left, ph - y, BODY_SIZE);
        draw_line(
            &mut self.content,
            &self.fonts.regular,
            &self.receipt_display,
            left + 90.0,
            ph - y,
            BODY_SIZE,
        );
        y += 12.0;

        draw_line(&mut self.content, &self.fonts.bold, META_LABELS[2], left, ph - y, BODY_SIZE);
        let supplier_lines = wrap_text(
            &self.first.supplier,
            META_SUPPLIER_W,
            &self.fonts.regular.metrics,
            BODY_SIZE,
        )
        .len();
        draw_wrapped(
            &mut self.content,
            &self.fonts.regular,
            &self.first.supplier,
            left + 80.0,
            ph - y,
            META_SUPPLIER_W,
            BODY_SIZE,
            LINE_H,
            HAlign::Left,
        );
        y += supplier_lines as f32 * LINE_H + 2.0;

        draw_line(&mut self.content, &self.fonts.bold, META_LABELS[3], left, ph - y, BODY_SIZE);
        let invoice_lines = wrap_text(
            &self.first.invoice_number,
            META_INVOICE_W,
            &self.fonts.regular.metrics,
            BODY_SIZE,
        )
        .len();
        draw_wrapped(
            &mut self.content,
            &self.fonts.regular,
            &self.first.invoice_number,
            left + 140.0,
            ph - y,
            META_INVOICE_W,
            BODY_SIZE,
            LINE_H,
            HAlign::Left,
        );
        y += invoice_lines as f32 * LINE_H + 6.0;

        let mut x = left;
        for (i, &(label, _)) in COLUMNS.iter().enumerate() {
            let w = self.col_widths[i];
            draw_wrapped(
                &mut self.content,
                &self.fonts.bold,
                label,
                x + CELL_PAD,
                ph - (y + 6.0),
                w - 2.0 * CELL_PAD,
                BODY_SIZE,
                LINE_H,
                HAlign::Left,
            );
            self.content
                .rect(x, ph - (y + HEADER_ROW_H), w, HEADER_ROW_H)
                .stroke();
            x += w;
        }
        y += HEADER_ROW_H;

        self.y = y;
        log::debug!(
            "page {} header ends at y={:.1}",
            self.contents.len() + 1,
            y
        );
    }

    fn finish_page(&mut self) {
        self.contents
            .push(std::mem::replace(&mut self.content, Content::new()));
    }

    /// Emit one data row: height is the tallest wrapped cell (floored at the
    /// row minimum); a row that would cross into the bottom reserve moves to
    /// a fresh page with the full header repeated.
    fn emit_row(&mut self, cells: &[String; 6]) {
        let mut row_h = MIN_ROW_H;
        for (value, &w) in cells.iter().zip(&self.col_widths) {
            let h = height_for(
                value,
                w - 2.0 * CELL_PAD,
                &self.fonts.regular.metrics,
                BODY_SIZE,
                LINE_H,
            ) + 8.0;
            row_h = row_h.max(h);
        }

        if self.y + row_h + ROW_RESERVE > self.cfg.page_height {
            self.finish_page();
            self.start_page();
        }

        let ph = self.cfg.page_height;
        let mut x = self.cfg.margin;
        for (i, value) in cells.iter().enumerate() {
            let w = self.col_widths[i];
            self.content.rect(x, ph - (self.y + row_h), w, row_h).stroke();
            let align = if RIGHT_ALIGNED[i] { HAlign::Right } else { HAlign::Left };
            draw_wrapped(
                &mut self.content,
                &self.fonts.regular,
                value,
                x + CELL_PAD,
                ph - (self.y + 6.0),
                w - 2.0 * CELL_PAD,
                BODY_SIZE,
                LINE_H,
                align,
            );
            x += w;
        }
        self.y += row_h;
    }

    /// The closing bold totals row, subject to the same overflow policy.
    fn emit_totals(&mut self, cells: &[String; 6]) {
        let row_h = MIN_ROW_H;
        if self.y + row_h + TOTALS_RESERVE > self.cfg.page_height {
            self.finish_page();
            self.start_page();
        }

        let ph = self.cfg.page_height;
        let mut x = self.cfg.margin;
        for (i, value) in cells.iter().enumerate() {
            let w = self.col_widths[i];
            self.content.rect(x, ph - (self.y + row_h), w, row_h).stroke();
            let align = if RIGHT_ALIGNED[i] { HAlign::Right } else { HAlign::Left };
            draw_wrapped(
                &mut self.content,
                &self.fonts.bold,
                value,
                x + CELL_PAD,
                ph - (self.y + 14.0),
                w - 2.0 * CELL_PAD,
                BODY_SIZE,
                LINE_H,
                align,
            );
            x += w;
        }
        self.y += row_h;
    }
}

/// Lay out the filtered rows as a paginated document and assemble the PDF.
/// `rows` must be non-empty — the caller filters and rejects an empty
/// selection before any layout work starts.
pub(crate) fn render(
    rows: &[Record],
    receipt_number: &str,
    cfg: &RenderConfig,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    let Some(first) = rows.first() else {
        return Err(Error::NoMatchingRows(receipt_number.to_string()));
    };

    let display: Vec<[String; 6]> = rows.iter().map(display_cells).collect();
    let sum_total_price: f64 = rows
        .iter()
        .map(|r| normalize_number(&r.total_price).unwrap_or(0.0))
        .sum();
    let sum_total_value: f64 = rows
        .iter()
        .map(|r| normalize_number(&r.total_value).unwrap_or(0.0))
        .sum();
    let totals: [String; 6] = [
        String::new(),
        "UKUPNO".to_string(),
        String::new(),
        String::new(),
        fixed2(sum_total_price),
        fixed2(sum_total_value),
    ];
    let receipt_display = format_integer(receipt_number);
    let title = format!("PRIMKA {receipt_display}");

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };
    let catalog_id = alloc();
    let pages_id = alloc();

    // Collect the characters each face will draw, for subsetting and
    // measurement of embedded typefaces.
    let mut bold_chars: HashSet<char> = HashSet::new();
    bold_chars.extend(cfg.company_name.chars());
    bold_chars.extend(title.chars());
    for label in META_LABELS {
        bold_chars.extend(label.chars());
    }
    for (label, _) in COLUMNS {
        bold_chars.extend(label.chars());
    }
    for cell in &totals {
        bold_chars.extend(cell.chars());
    }
    let mut regular_chars: HashSet<char> = HashSet::new();
    for line in &cfg.address_lines {
        regular_chars.extend(line.chars());
    }
    regular_chars.extend(first.date.chars());
    regular_chars.extend(receipt_display.chars());
    regular_chars.extend(first.supplier.chars());
    regular_chars.extend(first.invoice_number.chars());
    for cells in &display {
        for cell in cells {
            regular_chars.extend(cell.chars());
        }
    }
    bold_chars.insert(' ');
    regular_chars.insert(' ');

    let fonts = Fonts {
        regular: register_face(
            &mut pdf,
            cfg.regular_font.as_deref(),
            "Helvetica",
            "F1",
            &mut alloc,
            &regular_chars,
        ),
        bold: register_face(
            &mut pdf,
            cfg.bold_font.as_deref(),
            "Helvetica-Bold",
            "F2",
            &mut alloc,
            &bold_chars,
        ),
    };
    let t_fonts = t0.elapsed();

    let usable = cfg.page_width - 2.0 * cfg.margin;
    let col_widths: Vec<f32> = COLUMNS.iter().map(|&(_, frac)| frac * usable).collect();

    let mut builder = PageBuilder {
        cfg,
        fonts: &fonts,
        first,
        receipt_display,
        title,
        col_widths,
        contents: Vec::new(),
        content: Content::new(),
        y: 0.0,
    };
    builder.start_page();
    for cells in &display {
        builder.emit_row(cells);
    }
    builder.emit_totals(&totals);
    builder.finish_page();
    let contents = builder.contents;
    let t_layout = t0.elapsed();

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, cfg.page_width, cfg.page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_res = resources.fonts();
        font_res.pair(Name(fonts.regular.pdf_name.as_bytes()), fonts.regular.font_ref);
        font_res.pair(Name(fonts.bold.pdf_name.as_bytes()), fonts.bold.font_ref);
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Render phases: fonts={:.1}ms, layout={:.1}ms, assembly={:.1}ms ({} rows, {} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_assembly - t_layout).as_secs_f64() * 1000.0,
        rows.len(),
        n,
    );

    Ok(pdf.finish())
}
