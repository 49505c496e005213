//! Minimal FITS binary-table codec.
//!
//! Implements just enough of the FITS standard for the ingestion fixture:
//! an empty primary HDU followed by one BINTABLE extension of
//! double-precision scalar columns. Headers use fixed-format 80-byte
//! cards; header and data units are padded to 2880-byte blocks; table
//! data is big-endian `f64`, row-major.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::FixtureError;

const BLOCK: usize = 2880;
const CARD: usize = 80;
const CARDS_PER_BLOCK: usize = BLOCK / CARD;

// ---------------------------------------------------------------------------
// Table model
// ---------------------------------------------------------------------------

/// One named column of double-precision values with an optional TUNIT.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsColumn {
    pub name: String,
    pub unit: Option<String>,
    pub values: Vec<f64>,
}

/// A binary table plus the string-valued keywords of its extension header.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsTable {
    pub extname: Option<String>,
    pub columns: Vec<FitsColumn>,
    /// Descriptive keywords (`OBJECT`, `INSTRUME`, `BUNIT`, ...). Column
    /// and structural keywords are kept out of this map.
    pub keywords: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serialize `table` to `path` as `(empty primary HDU, BINTABLE)`.
///
/// All columns must have the same length; the output length is always a
/// multiple of 2880 bytes.
pub fn write_table(path: &Path, table: &FitsTable) -> Result<(), FixtureError> {
    let nrows = match table.columns.first() {
        Some(col) => col.values.len(),
        None => return Err(FixtureError::Malformed("table has no columns".to_string())),
    };
    for col in &table.columns {
        if col.values.len() != nrows {
            return Err(FixtureError::Malformed(format!(
                "column '{}' has {} values, expected {nrows}",
                col.name,
                col.values.len()
            )));
        }
    }
    let ncols = table.columns.len();
    let row_width = 8 * ncols;

    let mut buf = Vec::new();

    // Primary HDU: header only, no data.
    let mut cards = vec![
        logical_card("SIMPLE", true)?,
        int_card("BITPIX", 8)?,
        int_card("NAXIS", 0)?,
        logical_card("EXTEND", true)?,
    ];
    append_header(&mut buf, &cards);

    // Binary table extension header.
    cards = vec![
        string_card("XTENSION", "BINTABLE")?,
        int_card("BITPIX", 8)?,
        int_card("NAXIS", 2)?,
        int_card("NAXIS1", row_width as i64)?,
        int_card("NAXIS2", nrows as i64)?,
        int_card("PCOUNT", 0)?,
        int_card("GCOUNT", 1)?,
        int_card("TFIELDS", ncols as i64)?,
    ];
    for (i, col) in table.columns.iter().enumerate() {
        let n = i + 1;
        cards.push(string_card(&format!("TTYPE{n}"), &col.name)?);
        cards.push(string_card(&format!("TFORM{n}"), "D")?);
        if let Some(unit) = &col.unit {
            cards.push(string_card(&format!("TUNIT{n}"), unit)?);
        }
    }
    if let Some(extname) = &table.extname {
        cards.push(string_card("EXTNAME", extname)?);
    }
    for (key, value) in &table.keywords {
        cards.push(string_card(key, value)?);
    }
    append_header(&mut buf, &cards);

    // Table data: big-endian doubles, row-major, zero-padded to a block.
    for r in 0..nrows {
        for col in &table.columns {
            buf.extend_from_slice(&col.values[r].to_be_bytes());
        }
    }
    pad_to_block(&mut buf, 0u8);

    std::fs::write(path, buf)?;
    Ok(())
}

fn keyword_field(key: &str) -> Result<String, FixtureError> {
    if key.is_empty() || key.len() > 8 || !key.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-' || b == b'_') {
        return Err(FixtureError::Malformed(format!("invalid keyword '{key}'")));
    }
    Ok(format!("{key:<8}"))
}

fn finish_card(mut card: String) -> Result<String, FixtureError> {
    if card.len() > CARD {
        return Err(FixtureError::Malformed(format!(
            "card overflows 80 bytes: '{card}'"
        )));
    }
    while card.len() < CARD {
        card.push(' ');
    }
    Ok(card)
}

fn logical_card(key: &str, value: bool) -> Result<String, FixtureError> {
    let v = if value { "T" } else { "F" };
    finish_card(format!("{}= {v:>20}", keyword_field(key)?))
}

fn int_card(key: &str, value: i64) -> Result<String, FixtureError> {
    finish_card(format!("{}= {value:>20}", keyword_field(key)?))
}

fn string_card(key: &str, value: &str) -> Result<String, FixtureError> {
    // Embedded quotes double up; the quoted field is at least 8 chars wide.
    let escaped = value.replace('\'', "''");
    finish_card(format!("{}= '{escaped:<8}'", keyword_field(key)?))
}

fn append_header(buf: &mut Vec<u8>, cards: &[String]) {
    for card in cards {
        buf.extend_from_slice(card.as_bytes());
    }
    buf.extend_from_slice(format!("{:<80}", "END").as_bytes());
    pad_to_block(buf, b' ');
}

fn pad_to_block(buf: &mut Vec<u8>, fill: u8) {
    while buf.len() % BLOCK != 0 {
        buf.push(fill);
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read back the first BINTABLE extension of a FITS file.
///
/// Only scalar `D` (double) columns are understood; anything else is
/// [`FixtureError::Malformed`]. Mirrors how the ingestion pipeline selects
/// the first binary-table HDU when loading spectra.
pub fn read_table(path: &Path) -> Result<FitsTable, FixtureError> {
    let bytes = std::fs::read(path)?;
    let mut off = 0;

    while off < bytes.len() {
        let header = Header::parse(&bytes, &mut off)?;
        let data_len = header.data_len()?;
        let padded = data_len.div_ceil(BLOCK) * BLOCK;

        if header.string("XTENSION").as_deref() == Some("BINTABLE") {
            let end = off
                .checked_add(data_len)
                .filter(|&e| e <= bytes.len())
                .ok_or_else(|| FixtureError::Malformed("truncated table data".to_string()))?;
            return decode_table(&header, &bytes[off..end]);
        }
        off += padded;
    }
    Err(FixtureError::Malformed(
        "no binary table extension found".to_string(),
    ))
}

fn decode_table(header: &Header, data: &[u8]) -> Result<FitsTable, FixtureError> {
    let tfields = header.required_int("TFIELDS")? as usize;
    let naxis1 = header.required_int("NAXIS1")? as usize;
    let naxis2 = header.required_int("NAXIS2")? as usize;

    let mut columns = Vec::with_capacity(tfields);
    let mut row_offset = 0usize;
    for n in 1..=tfields {
        let form = header
            .string(&format!("TFORM{n}"))
            .ok_or_else(|| FixtureError::Malformed(format!("missing TFORM{n}")))?;
        if form != "D" && form != "1D" {
            return Err(FixtureError::Malformed(format!(
                "unsupported TFORM{n} '{form}' (only scalar doubles)"
            )));
        }
        let name = header
            .string(&format!("TTYPE{n}"))
            .unwrap_or_else(|| format!("COL{n}"));
        let unit = header.string(&format!("TUNIT{n}"));
        columns.push((name, unit, row_offset));
        row_offset += 8;
    }
    if row_offset != naxis1 {
        return Err(FixtureError::Malformed(format!(
            "row width {row_offset} disagrees with NAXIS1 {naxis1}"
        )));
    }
    if data.len() < naxis1 * naxis2 {
        return Err(FixtureError::Malformed("truncated table data".to_string()));
    }

    let decoded = columns
        .into_iter()
        .map(|(name, unit, col_off)| {
            let values = (0..naxis2)
                .map(|r| {
                    let at = r * naxis1 + col_off;
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&data[at..at + 8]);
                    f64::from_be_bytes(raw)
                })
                .collect();
            FitsColumn { name, unit, values }
        })
        .collect();

    Ok(FitsTable {
        extname: header.string("EXTNAME"),
        columns: decoded,
        keywords: header.descriptive_keywords(),
    })
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum CardValue {
    Str(String),
    Int(i64),
    Logical(bool),
}

struct Header {
    cards: Vec<(String, CardValue)>,
}

impl Header {
    /// Parse one header unit starting at `*off`, advancing `*off` past its
    /// padding to the first data block.
    fn parse(bytes: &[u8], off: &mut usize) -> Result<Self, FixtureError> {
        let mut cards = Vec::new();
        loop {
            if *off + BLOCK > bytes.len() {
                return Err(FixtureError::Malformed("truncated header block".to_string()));
            }
            let block = &bytes[*off..*off + BLOCK];
            *off += BLOCK;
            for i in 0..CARDS_PER_BLOCK {
                let card = &block[i * CARD..(i + 1) * CARD];
                // Byte-indexing below relies on this.
                let card = std::str::from_utf8(card)
                    .ok()
                    .filter(|c| c.is_ascii())
                    .ok_or_else(|| {
                        FixtureError::Malformed("non-ASCII header card".to_string())
                    })?;
                let keyword = card[..8].trim_end().to_string();
                if keyword == "END" {
                    return Ok(Self { cards });
                }
                if &card[8..10] != "= " {
                    // COMMENT/HISTORY/blank cards carry no value.
                    continue;
                }
                if let Some(value) = parse_value(&card[10..])? {
                    cards.push((keyword, value));
                }
            }
        }
    }

    fn get(&self, key: &str) -> Option<&CardValue> {
        self.cards.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(CardValue::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(CardValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    fn required_int(&self, key: &str) -> Result<i64, FixtureError> {
        self.int(key)
            .ok_or_else(|| FixtureError::Malformed(format!("missing {key}")))
    }

    /// Total bytes of the data unit following this header (unpadded).
    fn data_len(&self) -> Result<usize, FixtureError> {
        let naxis = self.required_int("NAXIS")?;
        if naxis == 0 {
            return Ok(0);
        }
        let bitpix = self.required_int("BITPIX")?.unsigned_abs() as usize / 8;
        let mut n = 1usize;
        for i in 1..=naxis {
            n *= self.required_int(&format!("NAXIS{i}"))? as usize;
        }
        let pcount = self.int("PCOUNT").unwrap_or(0) as usize;
        let gcount = self.int("GCOUNT").unwrap_or(1) as usize;
        Ok(bitpix * gcount * (pcount + n))
    }

    /// String-valued cards minus structural and per-column keywords.
    fn descriptive_keywords(&self) -> BTreeMap<String, String> {
        self.cards
            .iter()
            .filter_map(|(k, v)| match v {
                CardValue::Str(s) if !is_structural(k) => Some((k.clone(), s.clone())),
                _ => None,
            })
            .collect()
    }
}

fn is_structural(key: &str) -> bool {
    if key == "XTENSION" || key == "EXTNAME" {
        return true;
    }
    for prefix in ["TTYPE", "TFORM", "TUNIT"] {
        if let Some(rest) = key.strip_prefix(prefix) {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

fn parse_value(field: &str) -> Result<Option<CardValue>, FixtureError> {
    let trimmed = field.trim_start();
    if let Some(rest) = trimmed.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote, trailing blanks are not
        // significant.
        let mut out = String::new();
        let mut chars = rest.chars();
        loop {
            match chars.next() {
                Some('\'') => {
                    if chars.clone().next() == Some('\'') {
                        chars.next();
                        out.push('\'');
                    } else {
                        return Ok(Some(CardValue::Str(out.trim_end().to_string())));
                    }
                }
                Some(c) => out.push(c),
                None => {
                    return Err(FixtureError::Malformed(format!(
                        "unterminated string in card value '{field}'"
                    )))
                }
            }
        }
    }

    let bare = trimmed.split('/').next().unwrap_or("").trim();
    match bare {
        "" => Ok(None),
        "T" => Ok(Some(CardValue::Logical(true))),
        "F" => Ok(Some(CardValue::Logical(false))),
        other => Ok(other.parse::<i64>().ok().map(CardValue::Int)),
    }
}
