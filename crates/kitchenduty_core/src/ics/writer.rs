//! Minimal RFC 5545 content-line writer.
//!
//! # Responsibility
//! - Emit CRLF-terminated content lines, folded at 75 octets.
//! - Escape TEXT values.
//! - Keep `BEGIN`/`END` blocks balanced.
//!
//! # Invariants
//! - Folding never splits a UTF-8 sequence.
//! - `finish` closes any component still open, so output is always balanced.

const MAX_LINE_OCTETS: usize = 75;
const CRLF: &str = "\r\n";

/// Builder for iCalendar text.
#[derive(Debug, Default)]
pub struct IcsWriter {
    out: String,
    open: Vec<&'static str>,
}

impl IcsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a component (`BEGIN:<name>`).
    pub fn begin(&mut self, component: &'static str) -> &mut Self {
        self.raw(&format!("BEGIN:{component}"));
        self.open.push(component);
        self
    }

    /// Closes the innermost open component.
    pub fn end(&mut self) -> &mut Self {
        if let Some(component) = self.open.pop() {
            self.raw(&format!("END:{component}"));
        }
        self
    }

    /// Writes a property whose value is already in wire form.
    pub fn property(&mut self, name: &str, value: &str) -> &mut Self {
        self.raw(&format!("{name}:{value}"))
    }

    /// Writes a TEXT property, escaping its value.
    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.property(name, &escape_text(value))
    }

    /// Closes whatever is still open and returns the calendar text.
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.end();
        }
        self.out
    }

    fn raw(&mut self, line: &str) -> &mut Self {
        fold_into(&mut self.out, line);
        self
    }
}

/// Escapes a TEXT value: backslash, semicolon, comma and newlines.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Appends `line` to `out`, folding continuation lines with a leading space.
fn fold_into(out: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if used + width > budget {
            out.push_str(CRLF);
            out.push(' ');
            // The leading space counts toward the continuation line.
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(ch);
        used += width;
    }
    out.push_str(CRLF);
}
