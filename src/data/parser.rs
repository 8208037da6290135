/// Classification of a single cell's text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellKind {
    /// Parses as a finite decimal number.
    Numeric(f64),
    /// Empty or whitespace only; eligible for interpolation.
    Blank,
    /// Anything else, e.g. a `BLOCK` marker. Never overwritten, never an anchor.
    Keyword,
}

impl CellKind {
    pub fn is_blank(&self) -> bool {
        matches!(self, CellKind::Blank)
    }
}

pub fn classify(cell: &str) -> CellKind {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return CellKind::Blank;
    }
    match parse_number(trimmed) {
        Some(v) => CellKind::Numeric(v),
        None => CellKind::Keyword,
    }
}

/// Parse a cell as a number. `NaN` and infinities count as text, so they
/// can never become interpolation anchors.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render an interpolated or computed value. Uses the shortest text that
/// round-trips to the same `f64`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Decode file bytes as UTF-8, falling back to latin1 (each byte maps to the
/// same Unicode code point) so legacy exports still load.
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
