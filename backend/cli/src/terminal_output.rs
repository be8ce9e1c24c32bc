//! Terminal output utilities: ANSI notes and table rendering.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Warnings go to stderr so machine-readable stdout stays clean.
pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Column alignment.
pub enum Align {
    Left,
    Right,
}

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
    /// Longer cells are cut with `…`.
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| strip_ansi(&c.header).chars().count())
        .collect();
    for row in rows {
        for (i, cell) in row.iter().take(num_cols).enumerate() {
            let w = strip_ansi(cell).chars().count();
            let w = columns[i].max_width.map_or(w, |max| w.min(max));
            widths[i] = widths[i].max(w);
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    if supports_color() {
        out.push_str(&format!("{BOLD}  {}  {RESET}\n", header_cells.join("  ")));
    } else {
        out.push_str(&format!("  {}  \n", header_cells.join("  ")));
    }

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&truncate(cell, widths[i]), widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn truncate(s: &str, width: usize) -> String {
    let plain = strip_ansi(s);
    if plain.chars().count() <= width || width == 0 {
        return s.to_string();
    }
    let mut cut: String = plain.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(strip_ansi(s).chars().count());
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}
