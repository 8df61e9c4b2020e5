// crates/cli/src/presentation.rs
use std::io::Write;

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use wildcount_engine::results::ResultSet;
use wildcount_engine::{Category, Counter, CounterKind};

use crate::error::Result;
use crate::options::{OutputFormat, SizeFormat};

const TOTAL: &str = "total";

/// Writes `results` in `format`, stamping structured formats with the
/// current local time.
pub fn print_results<W: Write>(
    out: &mut W,
    results: &ResultSet,
    format: OutputFormat,
    sizes: SizeFormat,
) -> Result<()> {
    render(out, results, format, sizes, Local::now())
}

pub fn render<W: Write>(
    out: &mut W,
    results: &ResultSet,
    format: OutputFormat,
    sizes: SizeFormat,
    generated: DateTime<Local>,
) -> Result<()> {
    let rows = rows(results);
    match format {
        OutputFormat::Default => print_default(out, &rows, results.kind(), sizes)?,
        OutputFormat::Csv => print_csv(out, &rows, results.kind(), sizes)?,
        OutputFormat::Json => print_json(out, &rows, results.kind(), sizes, &generated)?,
        OutputFormat::Xml => print_xml(out, &rows, results.kind(), sizes, &generated)?,
    }
    out.flush()?;
    Ok(())
}

/// Records in traversal order, plus a total row once there is something to sum.
fn rows(results: &ResultSet) -> Vec<(&str, &Counter)> {
    let mut rows: Vec<_> = results
        .iter()
        .map(|record| (record.name.as_str(), &record.counter))
        .collect();
    if rows.len() > 1 {
        rows.push((TOTAL, results.total()));
    }
    rows
}

fn values(counter: &Counter, kind: CounterKind, sizes: SizeFormat) -> Vec<(Category, String)> {
    kind.categories()
        .map(|category| {
            let n = counter.count(category).unwrap_or(0);
            (category, sizes.render(n, category))
        })
        .collect()
}

fn print_default<W: Write>(
    out: &mut W,
    rows: &[(&str, &Counter)],
    kind: CounterKind,
    sizes: SizeFormat,
) -> std::io::Result<()> {
    for category in kind.categories() {
        write!(out, " {:>10}", category.label())?;
    }
    writeln!(out)?;
    for (name, counter) in rows {
        for (_, value) in values(counter, kind, sizes) {
            write!(out, " {value:>10}")?;
        }
        writeln!(out, " {name}")?;
    }
    Ok(())
}

fn print_csv<W: Write>(
    out: &mut W,
    rows: &[(&str, &Counter)],
    kind: CounterKind,
    sizes: SizeFormat,
) -> std::io::Result<()> {
    write!(out, "file name")?;
    for category in kind.categories() {
        write!(out, ",{}", category.label())?;
    }
    writeln!(out)?;
    for (name, counter) in rows {
        write!(out, "{}", csv_field(name))?;
        for (_, value) in values(counter, kind, sizes) {
            write!(out, ",\"{value}\"")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn csv_field(name: &str) -> String {
    if name.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_owned()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    timestamp: String,
    results: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<String>,
}

impl<'a> JsonRow<'a> {
    fn new(filename: &'a str, counter: &Counter, kind: CounterKind, sizes: SizeFormat) -> Self {
        let mut row = Self {
            filename,
            lines: None,
            words: None,
            characters: None,
            bytes: None,
        };
        for (category, value) in values(counter, kind, sizes) {
            let slot = match category {
                Category::Lines => &mut row.lines,
                Category::Words => &mut row.words,
                Category::Characters => &mut row.characters,
                Category::Bytes => &mut row.bytes,
            };
            *slot = Some(value);
        }
        row
    }
}

fn print_json<W: Write>(
    out: &mut W,
    rows: &[(&str, &Counter)],
    kind: CounterKind,
    sizes: SizeFormat,
    generated: &DateTime<Local>,
) -> Result<()> {
    let report = JsonReport {
        timestamp: timestamp(generated),
        results: rows
            .iter()
            .map(|(name, counter)| JsonRow::new(name, counter, kind, sizes))
            .collect(),
    };
    serde_json::to_writer(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn print_xml<W: Write>(
    out: &mut W,
    rows: &[(&str, &Counter)],
    kind: CounterKind,
    sizes: SizeFormat,
    generated: &DateTime<Local>,
) -> std::io::Result<()> {
    writeln!(out, r#"<?xml version="1.0"?>"#)?;
    write!(
        out,
        "<wildcount><timestamp>{}</timestamp><results>",
        timestamp(generated)
    )?;
    for (name, counter) in rows {
        write!(out, "<result><file-name>{}</file-name>", xml_escape(name))?;
        for (category, value) in values(counter, kind, sizes) {
            let tag = category.label();
            write!(out, "<{tag}>{}</{tag}>", xml_escape(&value))?;
        }
        write!(out, "</result>")?;
    }
    writeln!(out, "</results></wildcount>")
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn timestamp(generated: &DateTime<Local>) -> String {
    generated.to_rfc3339_opts(SecondsFormat::Secs, false)
}

impl SizeFormat {
    pub fn render(self, n: u64, category: Category) -> String {
        match self {
            Self::Comma => with_commas(n),
            Self::Human if category == Category::Bytes => si_bytes(n),
            Self::Human => with_commas(n),
        }
    }
}

fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Decimal units, one fractional digit below ten: `142 B`, `1.2 kB`, `35 MB`.
fn si_bytes(n: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
    if n < 10 {
        return format!("{n} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let value = n as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let exp = ((value.ln() / 1000f64.ln()).floor() as usize).min(UNITS.len() - 1);
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let scaled = (value / 1000f64.powi(exp as i32) * 10.0 + 0.5).floor() / 10.0;
    if scaled < 10.0 {
        format!("{scaled:.1} {}", UNITS[exp])
    } else {
        format!("{scaled:.0} {}", UNITS[exp])
    }
}
