use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use regex::Regex;

use crate::{common::PendingWrite, error::AdmError, table::CentroidRecord, translate::Translator};

/// A centroid row ready for the front end: the leaf region is the city name.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedRecord {
    pub name: String,
    pub name_translated: String,
    pub state: String,
    pub state_translated: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl TranslatedRecord {
    /// Attach translations. There is no table for leaf names, so the leaf is its own translation.
    pub fn new(record: CentroidRecord, translator: &Translator) -> Self {
        let state_translated = translator.translate(&record.state).to_string();
        Self {
            name_translated: record.subdistrict.clone(),
            name: record.subdistrict,
            state: record.state,
            state_translated,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

const CITY_INTERFACE: &str = "\
export interface City {
  name: string;
  nameHindi: string;
  state: string;
  stateHindi: string;
  latitude: number;
  longitude: number;
}
";

/// Renders records as a typed TypeScript array literal.
#[derive(Debug, Clone)]
pub struct LiteralEmitter {
    export_name: String,
}

impl Default for LiteralEmitter {
    fn default() -> Self {
        Self { export_name: "cities".into() }
    }
}

impl LiteralEmitter {
    /// Emitter exporting the array under `export_name`, which must be a valid identifier.
    pub fn new(export_name: &str) -> Result<Self> {
        let ident = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")?;
        if !ident.is_match(export_name) {
            return Err(AdmError::configuration(format!("invalid export name {export_name:?}")).into());
        }
        Ok(Self { export_name: export_name.to_string() })
    }

    /// Write the interface declaration and array literal to `writer`.
    pub fn write_to(&self, writer: &mut impl Write, records: &[TranslatedRecord]) -> Result<()> {
        writeln!(writer, "{CITY_INTERFACE}")?;
        writeln!(writer, "export const {}: City[] = [", self.export_name)?;

        for (i, city) in records.iter().enumerate() {
            write!(
                writer,
                r#"  {{ name: "{}", nameHindi: "{}", state: "{}", stateHindi: "{}", latitude: {}, longitude: {} }}"#,
                escape(&city.name),
                escape(&city.name_translated),
                escape(&city.state),
                escape(&city.state_translated),
                number(city.latitude),
                number(city.longitude),
            )?;
            if i + 1 < records.len() {
                write!(writer, ",")?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "];")?;
        Ok(())
    }

    /// Render to a string.
    pub fn render(&self, records: &[TranslatedRecord]) -> Result<String> {
        let mut out = Vec::new();
        self.write_to(&mut out, records)?;
        String::from_utf8(out).context("[emit] output is not valid UTF-8")
    }

    /// Write to `path` atomically.
    pub fn write(&self, path: &Path, records: &[TranslatedRecord]) -> Result<()> {
        let mut sink = PendingWrite::open(path)?;
        self.write_to(&mut sink, records)
            .with_context(|| format!("[emit] Failed to write {}", path.display()))?;
        sink.finalize()
    }
}

/// Escape for a double-quoted TypeScript string; line terminators must not appear raw.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// TypeScript numeric literal; `f64` Display already prints shortest round-trip digits.
fn number(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else {
        v.to_string()
    }
}
