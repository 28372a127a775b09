use std::collections::VecDeque;
use std::env;
use std::io;

use serde::{Deserialize, Serialize};

/// How many submitted commands the ring keeps.
pub const HISTORY_SIZE: usize = 100;

/// Bounded most-recent-first command history with a navigation cursor.
///
/// The cursor lives in `[0, len]`: 0 means "not viewing" at the fresh end
/// (the next `older` returns the most recent entry) and `len` means the
/// navigation walked past the oldest entry ("start fresh empty"). Recording
/// a command always resets the cursor.
pub struct History {
    items: VecDeque<String>,
    cursor: usize,
}

#[derive(Serialize, Deserialize)]
struct HistoryFile {
    commands: Vec<String>,
}

impl History {
    pub fn new() -> History {
        History { items: VecDeque::new(), cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Insert at the front, evicting the oldest entry past capacity, and
    /// reset the cursor to "not viewing".
    pub fn record(&mut self, cmd: String) {
        self.items.push_front(cmd);
        if self.items.len() > HISTORY_SIZE {
            self.items.pop_back();
        }
        self.cursor = 0;
    }

    /// Step toward the oldest entry. Past the oldest, returns None and stays
    /// there so the front-end shows an empty edit buffer.
    pub fn older(&mut self) -> Option<String> {
        if self.cursor < self.items.len() {
            let cmd = self.items[self.cursor].clone();
            self.cursor += 1;
            Some(cmd)
        } else {
            None
        }
    }

    /// Step back toward the most recent entry. Past the newest, returns None
    /// with the cursor back at "not viewing".
    pub fn newer(&mut self) -> Option<String> {
        if self.cursor > 0 {
            self.cursor -= 1;
            Some(self.items[self.cursor].clone())
        } else {
            None
        }
    }

    // ── Persistence across sessions ────────────────────────────────────

    fn default_path() -> Option<String> {
        let home = env::var("HOME").or_else(|_| env::var("USERPROFILE")).ok()?;
        Some(format!("{}/.replink_history", home))
    }

    /// Load saved history, most-recent-first. Missing or corrupt files are
    /// simply an empty history.
    pub fn load() -> History {
        let mut h = History::new();
        let path = match History::default_path() {
            Some(p) => p,
            None => return h,
        };
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Ok(file) = serde_json::from_str::<HistoryFile>(&content) {
                h.items = file.commands.into_iter().take(HISTORY_SIZE).collect();
            }
        }
        h
    }

    pub fn save(&self) -> io::Result<()> {
        let path = History::default_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        let file = HistoryFile { commands: self.items.iter().cloned().collect() };
        let json = serde_json::to_string(&file)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_most_recent_100() {
        let mut h = History::new();
        for i in 1..=150 {
            h.record(format!("c{}", i));
        }
        assert_eq!(h.len(), 100);
        assert_eq!(h.older(), Some("c150".to_string()));
        // Walk to the oldest surviving entry.
        let mut last = None;
        while let Some(cmd) = h.older() {
            last = Some(cmd);
        }
        assert_eq!(last, Some("c51".to_string()));
    }

    #[test]
    fn test_full_walk_returns_to_not_viewing() {
        let mut h = History::new();
        for i in 1..=100 {
            h.record(format!("c{}", i));
        }
        for _ in 0..100 {
            assert!(h.older().is_some());
        }
        assert_eq!(h.older(), None);
        for _ in 0..100 {
            assert!(h.newer().is_some());
        }
        assert_eq!(h.newer(), None);
        // Fresh state again: older() starts from the most recent.
        assert_eq!(h.older(), Some("c100".to_string()));
    }

    #[test]
    fn test_record_resets_cursor() {
        let mut h = History::new();
        h.record("a".into());
        h.record("b".into());
        assert_eq!(h.older(), Some("b".into()));
        assert_eq!(h.older(), Some("a".into()));
        h.record("c".into());
        assert_eq!(h.older(), Some("c".into()));
    }

    #[test]
    fn test_empty_history_navigation() {
        let mut h = History::new();
        assert_eq!(h.older(), None);
        assert_eq!(h.newer(), None);
    }
}
