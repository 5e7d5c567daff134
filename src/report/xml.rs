//! Flat records to PRTG XML.
//!
//! The output is indented with one tab per nesting level and carries one
//! element per line. Record order and field order are kept as given.

use serde::{Deserialize, Serialize};

pub const ROOT: &str = "PRTG";
pub const RESULT: &str = "Result";

/// One `<name>value</name>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(name: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

/// Ordered fields of one record.
pub type Record = Vec<Field>;

/// How records map onto `<Result>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultLayout {
    /// All records share a single `<Result>`.
    #[default]
    Combined,
    /// One `<Result>` per record.
    PerRecord,
}

impl std::str::FromStr for ResultLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combined" => Ok(Self::Combined),
            "per-record" => Ok(Self::PerRecord),
            other => Err(format!("unknown result layout: {other}")),
        }
    }
}

struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            buf: String::new(),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push('\t');
        }
    }

    fn open(&mut self, name: &str) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth -= 1;
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    fn field(&mut self, field: &Field) {
        self.indent();
        push_element(&mut self.buf, field.name, &field.value);
        self.buf.push('\n');
    }

    fn finish(mut self) -> String {
        // no trailing newline; the caller decides how to terminate the output
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
        self.buf
    }
}

fn push_element(buf: &mut String, name: &str, text: &str) {
    buf.push('<');
    buf.push_str(name);
    buf.push('>');
    escape_into(buf, text);
    buf.push_str("</");
    buf.push_str(name);
    buf.push('>');
}

fn escape_into(buf: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            c => buf.push(c),
        }
    }
}

/// Serialize `records` into a `<PRTG>` document.
pub fn serialize(records: &[Record], layout: ResultLayout) -> String {
    let mut w = XmlWriter::new();
    w.open(ROOT);

    match layout {
        ResultLayout::Combined => {
            w.open(RESULT);
            for field in records.iter().flatten() {
                w.field(field);
            }
            w.close(RESULT);
        }
        ResultLayout::PerRecord => {
            for record in records {
                w.open(RESULT);
                for field in record {
                    w.field(field);
                }
                w.close(RESULT);
            }
        }
    }

    w.close(ROOT);
    w.finish()
}

/// The in-band failure document: an error flag and the message.
pub fn error_document(message: &str) -> String {
    let mut buf = String::new();
    buf.push('<');
    buf.push_str(ROOT);
    buf.push('>');
    push_element(&mut buf, "Error", "1");
    push_element(&mut buf, "Text", message);
    buf.push_str("</");
    buf.push_str(ROOT);
    buf.push('>');
    buf
}
