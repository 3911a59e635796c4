//! Process-wide long-term fact memory.
//!
//! Facts are short strings extracted from user turns, appended exactly once
//! (case-sensitive match) and injected into future requests as a compact
//! semicolon-joined summary. No normalization beyond trimming — near
//! duplicates that differ in punctuation are accepted as distinct.

use crate::{load_list, save_list};
use murmur_types::error::MurmurResult;
use std::path::PathBuf;
use std::sync::Mutex;

/// Document name under the data directory.
const LONG_MEMORY_FILE: &str = "long_memory.json";

/// Append-only deduplicated store of extracted facts.
pub struct FactStore {
    path: PathBuf,
    facts: Mutex<Vec<String>>,
}

impl FactStore {
    /// Open the fact store under `data_dir`, loading the existing document.
    /// A missing or malformed document starts empty and is re-initialized.
    pub fn open(data_dir: &std::path::Path) -> MurmurResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LONG_MEMORY_FILE);
        let facts: Vec<String> = load_list(&path)?;
        Ok(Self {
            path,
            facts: Mutex::new(facts),
        })
    }

    /// Remember a fact if it is non-empty and not already known verbatim.
    /// Returns whether the fact was newly added (and persisted).
    pub fn remember(&self, fact: &str) -> MurmurResult<bool> {
        let fact = fact.trim();
        if fact.is_empty() {
            return Ok(false);
        }
        let mut facts = self.facts.lock().unwrap_or_else(|e| e.into_inner());
        if facts.iter().any(|f| f == fact) {
            return Ok(false);
        }
        facts.push(fact.to_string());
        save_list(&self.path, &facts)?;
        Ok(true)
    }

    /// A single-string summary of all facts, semicolon-joined, or `None` when
    /// nothing has been remembered yet.
    pub fn summary(&self) -> Option<String> {
        let facts = self.facts.lock().unwrap_or_else(|e| e.into_inner());
        if facts.is_empty() {
            None
        } else {
            Some(facts.join("; "))
        }
    }

    /// Number of distinct facts held.
    pub fn len(&self) -> usize {
        self.facts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
