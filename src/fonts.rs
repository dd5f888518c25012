use std::collections::{HashMap, HashSet};

use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

/// Width tables and vertical metrics for one typeface. This is the text
/// measurer: wrapping and alignment work from these numbers alone, without
/// touching the PDF writer, so layout stays a pure function of text + width.
pub struct FontMetrics {
    /// WinAnsi chars 32..=255 at 1000 units/em.
    widths_1000: Vec<f32>,
    /// Per-char widths for embedded faces (covers every char seen in the
    /// document, including ones outside WinAnsi).
    char_widths_1000: Option<HashMap<char, f32>>,
}

impl FontMetrics {
    /// Approximate Helvetica metrics, used when no typeface bytes are
    /// supplied.
    pub fn helvetica() -> Self {
        FontMetrics {
            widths_1000: helvetica_widths(),
            char_widths_1000: None,
        }
    }

    fn from_face(face: &Face, used_chars: &HashSet<char>) -> Self {
        let units = face.units_per_em() as f32;
        let widths_1000: Vec<f32> = (32u8..=255u8)
            .map(|byte| {
                face.glyph_index(winansi_to_char(byte))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / units * 1000.0)
                    .unwrap_or(0.0)
            })
            .collect();
        let mut char_widths_1000 = HashMap::new();
        for &ch in used_chars {
            if let Some(gid) = face.glyph_index(ch) {
                let w = face
                    .glyph_hor_advance(gid)
                    .map(|adv| adv as f32 / units * 1000.0)
                    .unwrap_or(0.0);
                char_widths_1000.insert(ch, w);
            }
        }
        FontMetrics {
            widths_1000,
            char_widths_1000: Some(char_widths_1000),
        }
    }

    /// Width of a single character in 1000-units. Uses the per-char cache
    /// for embedded faces, falls back to the WinAnsi table.
    fn char_width_1000(&self, ch: char) -> f32 {
        if let Some(ref map) = self.char_widths_1000
            && let Some(&w) = map.get(&ch)
        {
            return w;
        }
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub fn char_width(&self, ch: char, font_size: f32) -> f32 {
        self.char_width_1000(ch) * font_size / 1000.0
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub fn space_width(&self, font_size: f32) -> f32 {
        self.char_width(' ', font_size)
    }
}

/// A typeface registered in the output document: measurement tables plus the
/// PDF objects text drawing refers to.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) metrics: FontMetrics,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl FontEntry {
    /// Encode text for a content-stream `show` op: 2-byte glyph IDs for
    /// embedded CIDFonts, WinAnsi bytes (unmappable chars dropped) for the
    /// built-in fallback.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Register one typeface in the document. Caller-supplied TTF bytes are
/// embedded as a subsetted CIDFont; when absent (or unusable) the built-in
/// Type1 base font named by `fallback` is used with approximate widths.
pub(crate) fn register_face(
    pdf: &mut Pdf,
    ttf: Option<&[u8]>,
    fallback: &str,
    pdf_name: &str,
    alloc: &mut impl FnMut() -> Ref,
    used_chars: &HashSet<char>,
) -> FontEntry {
    let font_ref = alloc();

    if let Some(data) = ttf {
        match embed_truetype(pdf, font_ref, data, used_chars, alloc) {
            Some((metrics, char_to_gid)) => {
                return FontEntry {
                    pdf_name: pdf_name.to_string(),
                    font_ref,
                    metrics,
                    char_to_gid: Some(char_to_gid),
                };
            }
            None => {
                log::warn!("supplied typeface could not be embedded — using {fallback}");
            }
        }
    }

    pdf.type1_font(font_ref)
        .base_font(Name(fallback.as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        pdf_name: pdf_name.to_string(),
        font_ref,
        metrics: FontMetrics::helvetica(),
        char_to_gid: None,
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with
/// Identity-H encoding, subsetted to the glyphs the document actually uses.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font_data: &[u8],
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<(FontMetrics, HashMap<char, u16>)> {
    let face = Face::parse(font_data, 0).ok()?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let metrics = FontMetrics::from_face(&face, used_chars);

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            char_to_gid.insert(ch, remapper.remap(gid.0));
        }
    }

    let subset_data = subsetter::subset(font_data, 0, &remapper).unwrap_or_else(|e| {
        log::warn!("font subsetting failed: {e} — embedding full font");
        font_data.to_vec()
    });

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_family_name(&face)
        .unwrap_or_else(|| "Embedded".to_string())
        .replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = char_to_gid
            .iter()
            .filter_map(|(&ch, &new_gid)| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| (new_gid, adv as f32 / units * 1000.0))
            })
            .collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some((metrics, char_to_gid))
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes for PDF Str encoding. Chars with
/// no WinAnsi mapping are dropped (best-effort, matching measurement).
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| {
            let b = char_to_winansi(c);
            if b >= 32 { Some(b) } else { None }
        })
        .collect()
}

/// Encode text as big-endian 2-byte glyph IDs for CIDFont content streams.
fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}
