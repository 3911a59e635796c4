//! Per-conversation short-term transcripts.

use crate::{load_list, save_list};
use murmur_types::error::MurmurResult;
use murmur_types::message::ChatTurn;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Store for the rolling per-conversation transcripts.
///
/// Each conversation's history is cached in memory and mirrored to
/// `short/<chat_id>.json` after every mutation.
pub struct TranscriptStore {
    dir: PathBuf,
    cache: Mutex<HashMap<i64, Vec<ChatTurn>>>,
}

impl TranscriptStore {
    /// Open the transcript store under `data_dir`, creating `short/` if
    /// needed. Existing documents are loaded lazily on first access.
    pub fn open(data_dir: &std::path::Path) -> MurmurResult<Self> {
        let dir = data_dir.join("short");
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn path_for(&self, chat_id: i64) -> PathBuf {
        self.dir.join(format!("{chat_id}.json"))
    }

    /// Get a snapshot of a conversation's history, loading it from disk on
    /// first access. A missing or malformed document yields an empty history.
    pub fn history(&self, chat_id: i64) -> MurmurResult<Vec<ChatTurn>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(turns) = cache.get(&chat_id) {
            return Ok(turns.clone());
        }
        let turns: Vec<ChatTurn> = load_list(&self.path_for(chat_id))?;
        cache.insert(chat_id, turns.clone());
        Ok(turns)
    }

    /// Append a turn to a conversation's history and persist it.
    pub fn push(&self, chat_id: i64, turn: ChatTurn) -> MurmurResult<()> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let turns = match cache.get_mut(&chat_id) {
            Some(t) => t,
            None => {
                let loaded: Vec<ChatTurn> = load_list(&self.path_for(chat_id))?;
                cache.entry(chat_id).or_insert(loaded)
            }
        };
        turns.push(turn);
        save_list(&self.path_for(chat_id), turns)
    }

    /// Return the content of the most recent user turn, if any.
    pub fn last_user_turn(&self, chat_id: i64) -> MurmurResult<Option<String>> {
        let turns = self.history(chat_id)?;
        Ok(turns
            .iter()
            .rev()
            .find(|t| t.role == murmur_types::message::Role::User)
            .map(|t| t.content.clone()))
    }

    /// Clear a conversation's history and persist the empty document.
    pub fn clear(&self, chat_id: i64) -> MurmurResult<()> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(chat_id, Vec::new());
        save_list::<ChatTurn>(&self.path_for(chat_id), &[])
    }
}
