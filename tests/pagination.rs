mod common;

use primka_pdf::{RenderConfig, SheetFormat, generate_pdf_bytes};

fn single_line_rows(n: usize) -> Vec<u8> {
    let rows: Vec<String> = (0..n)
        .map(|i| {
            common::csv_row(
                "7",
                &format!("{}", 100 + i),
                "Vijak M6",
                "kom",
                "10",
                "0,50",
                "5,00",
                "5,00",
            )
        })
        .collect();
    common::csv_bytes(&rows)
}

fn pages_for(n: usize) -> usize {
    let pdf = generate_pdf_bytes(
        &single_line_rows(n),
        SheetFormat::Delimited,
        "7",
        &RenderConfig::default(),
    )
    .unwrap();
    common::page_count(&pdf)
}

// With the default geometry (595 pt tall, header block ending 166 pt from
// the top, 22 pt single-line rows, 30 pt bottom reserve) a full page holds
// exactly 18 data rows.

#[test]
fn few_rows_fit_on_one_page() {
    assert_eq!(pages_for(1), 1);
    assert_eq!(pages_for(5), 1);
}

#[test]
fn totals_row_spills_onto_a_fresh_page_when_rows_fill_the_last_one() {
    assert_eq!(pages_for(17), 1);
    assert_eq!(pages_for(18), 2);
}

#[test]
fn full_pages_repeat_the_header_and_continue() {
    assert_eq!(pages_for(19), 2);
    assert_eq!(pages_for(36), 3);
    assert_eq!(pages_for(40), 3);
}

#[test]
fn every_page_repeats_the_title_block() {
    let pdf = generate_pdf_bytes(
        &single_line_rows(40),
        SheetFormat::Delimited,
        "7",
        &RenderConfig::default(),
    )
    .unwrap();
    let text = common::content_text(&pdf);
    let title_count = text.matches("(PRIMKA 7)").count();
    assert_eq!(title_count, common::page_count(&pdf));
}

#[test]
fn taller_pages_hold_more_rows() {
    let mut tall = RenderConfig::default();
    tall.page_height = 595.0 + 22.0 * 5.0;
    let pdf = generate_pdf_bytes(&single_line_rows(22), SheetFormat::Delimited, "7", &tall).unwrap();
    assert_eq!(common::page_count(&pdf), 1);

    let pdf = generate_pdf_bytes(
        &single_line_rows(22),
        SheetFormat::Delimited,
        "7",
        &RenderConfig::default(),
    )
    .unwrap();
    assert_eq!(common::page_count(&pdf), 2);
}
