use std::{collections::HashMap, fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Built-in state / union territory names in Hindi.
const BUILTIN_NAMES: &str = include_str!("../data/names_hi.json");

/// Parsed once per process on first use.
static BUILTIN: OnceLock<Translator> = OnceLock::new();

/// On-disk name table: `{ "locale": "hi", "names": { "Kerala": "केरल", ... } }`.
#[derive(Debug, Deserialize)]
struct NameTable {
    locale: String,
    names: HashMap<String, String>,
}

/// Immutable lookup from top-level region names to a second-language label.
///
/// Keys match exactly after trimming surrounding whitespace; no case or
/// diacritic folding. Unknown names translate to themselves.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    names: HashMap<String, String>,
}

impl Translator {
    /// The embedded Hindi table.
    pub fn builtin() -> Result<Self> {
        if let Some(translator) = BUILTIN.get() {
            return Ok(translator.clone());
        }
        let translator = Self::from_json(BUILTIN_NAMES).context("[translate] built-in name table is invalid")?;
        Ok(BUILTIN.get_or_init(|| translator).clone())
    }

    /// Parse a name table from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let table: NameTable = serde_json::from_str(text).context("[translate] Failed to parse name table")?;
        Ok(Self {
            locale: table.locale,
            names: table.names.into_iter()
                .map(|(name, label)| (name.trim().to_string(), label))
                .collect(),
        })
    }

    /// Load a name table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[translate] Failed to read name table: {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("[translate] Invalid name table: {}", path.display()))
    }

    #[inline] pub fn locale(&self) -> &str { &self.locale }

    #[inline] pub fn len(&self) -> usize { self.names.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.names.is_empty() }

    /// Translate `name`, or return it unchanged when the table has no entry.
    pub fn translate<'a>(&'a self, name: &'a str) -> &'a str {
        self.names.get(name.trim()).map(String::as_str).unwrap_or(name)
    }
}
