use std::fmt;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

/// A vehicle registration number, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: &str) -> Option<Identifier> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Identifier(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One identifier per non-blank line, in file order. Duplicates are kept.
pub fn parse_identifiers(text: &str) -> Vec<Identifier> {
    text.lines().filter_map(Identifier::new).collect()
}

pub fn load_identifiers<P: AsRef<Path>>(path: P) -> Result<Vec<Identifier>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| LookupError::io(path, e))?;
    let identifiers = parse_identifiers(&text);
    info!("Loaded {} registration numbers from {:?}", identifiers.len(), path);
    Ok(identifiers)
}
