//! Memory persistence for the murmur bot.
//!
//! Two kinds of JSON-array documents live under the data directory:
//! - **Short-term transcripts**: one `short/<chat_id>.json` per conversation,
//!   the ordered role-tagged turns sent to the completion service as context.
//! - **Long-term facts**: a single `long_memory.json` of distinct extracted
//!   fact strings, shared across all conversations.
//!
//! A missing or malformed document is treated as an empty list and rewritten
//! to disk immediately; storage problems recover locally and are never fatal.

pub mod facts;
pub mod transcript;

pub use facts::FactStore;
pub use transcript::TranscriptStore;

use murmur_types::error::{MurmurError, MurmurResult};
use std::path::Path;

/// Load a JSON-array document, resetting it to `[]` on any failure.
///
/// Returns the parsed elements. If the file is missing or does not parse as a
/// JSON array of `T`, an empty list is returned and an empty array is written
/// back so the document exists in a known-good state.
pub(crate) fn load_list<T: serde::de::DeserializeOwned>(path: &Path) -> MurmurResult<Vec<T>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Vec<T>>(&contents) {
            Ok(items) => return Ok(items),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Malformed memory document, resetting to empty"
                );
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(MurmurError::Io(e)),
    }

    std::fs::write(path, "[]")?;
    Ok(Vec::new())
}

/// Serialize a list to its document path, pretty-printed.
pub(crate) fn save_list<T: serde::Serialize>(path: &Path, items: &[T]) -> MurmurResult<()> {
    let contents = serde_json::to_string_pretty(items)
        .map_err(|e| MurmurError::Serialization(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}
