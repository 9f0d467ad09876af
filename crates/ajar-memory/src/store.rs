//! File-backed memory store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ajar_types::fs::write_atomic;
use ajar_types::{MemoryDraft, MemoryNote, NoteId};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{MemoryError, Result};
use crate::validation::{validate_draft, validate_session_id};

/// Memory store backed by a single JSON array file.
///
/// Ids are unique across the whole store and assigned as `max(existing) + 1`
/// while holding the write lock, so concurrent appends through one handle
/// never collide. Share the handle (`Arc<MemoryStore>`) rather than opening
/// the same file twice.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Open or create a memory store at the given path.
    ///
    /// Creates the parent directory and an empty collection if missing. Failure
    /// here means the store cannot work at all and is returned to the caller.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| MemoryError::Storage {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if !path.exists() {
            write_atomic(&path, b"[]").map_err(|source| MemoryError::Storage {
                path: path.clone(),
                source,
            })?;
        }

        info!(path = %path.display(), "Memory store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Handle on a collection that may not exist yet.
    ///
    /// Reads treat a missing file as empty; the first append creates the
    /// directory and the file.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing collection.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a note with a tag list and no supervised fields.
    pub fn append(
        &self,
        session_id: &str,
        kind: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<MemoryNote> {
        self.append_draft(session_id, MemoryDraft::new(kind, content).with_tags(tags))
    }

    /// Append a fully specified note, persisting it before returning.
    ///
    /// Duplicate content is allowed. Entries already in the file are written
    /// back untouched, including ones this version cannot parse.
    pub fn append_draft(&self, session_id: &str, draft: MemoryDraft) -> Result<MemoryNote> {
        validate_session_id(session_id)?;
        validate_draft(&draft)?;

        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;

        let id = next_id(&entries);
        let note = MemoryNote {
            id,
            session_id: session_id.to_string(),
            kind: draft.kind,
            tags: draft.tags,
            content: draft.content,
            input: draft.input,
            ideal_output: draft.ideal_output,
            reason: draft.reason,
            created_at: ajar_types::now(),
        };

        entries.push(serde_json::to_value(&note)?);
        let bytes = serde_json::to_vec_pretty(&entries)?;
        write_atomic(&self.path, &bytes).map_err(|source| MemoryError::Storage {
            path: self.path.clone(),
            source,
        })?;

        debug!(id, session_id, kind = %note.kind, "Stored memory note");
        Ok(note)
    }

    /// Notes of `session_id` whose content contains `text`, ignoring case.
    ///
    /// Most recent first (ties broken by higher id), at most `limit` notes.
    /// A missing or damaged collection yields an empty result.
    pub fn query_relevant(&self, session_id: &str, text: &str, limit: usize) -> Vec<MemoryNote> {
        let needle = text.to_lowercase();
        let mut matches: Vec<MemoryNote> = self
            .list()
            .into_iter()
            .filter(|n| n.session_id == session_id)
            .filter(|n| n.content.to_lowercase().contains(&needle))
            .collect();

        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        matches.truncate(limit);

        debug!(session_id, matched = matches.len(), "Memory relevance query");
        matches
    }

    /// All notes in stored order. A missing or damaged collection yields an empty list.
    pub fn list(&self) -> Vec<MemoryNote> {
        load_notes(&self.path)
    }

    /// Raw entries for the write path. Unlike reads, a damaged file is an error.
    fn read_entries(&self) -> Result<Vec<Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(MemoryError::Storage {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(MemoryError::Corrupted {
                path: self.path.clone(),
                reason: "top-level value is not an array".to_string(),
            }),
            Err(e) => Err(MemoryError::Corrupted {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

fn next_id(entries: &[Value]) -> NoteId {
    entries
        .iter()
        .filter_map(|e| e.get("id").and_then(Value::as_u64))
        .max()
        .map_or(1, |max| max + 1)
}

/// Read every parseable note from a collection file without locking.
///
/// Missing file, unreadable file and non-array content all yield an empty
/// list; individual entries that fail to parse are skipped with a warning.
pub fn load_notes(path: &Path) -> Vec<MemoryNote> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Memory collection not found");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read memory collection");
            return Vec::new();
        }
    };

    if raw.trim().is_empty() {
        return Vec::new();
    }

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(path = %path.display(), "Memory collection is not an array, ignoring");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse memory collection");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(note) => Some(note),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed memory note");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::validation::ValidationError;

    fn temp_store() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("data").join("memories.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_at_defers_creation_to_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("memories.json");
        let store = MemoryStore::at(&path);

        assert!(store.query_relevant("s", "", 5).is_empty());
        assert!(store.list().is_empty());
        assert!(!path.exists());

        let note = store.append("s", "note", "first", Vec::new()).unwrap();
        assert_eq!(note.id, 1);
        assert!(path.exists());
    }

    #[test]
    fn test_open_creates_empty_collection() {
        let (_dir, store) = temp_store();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = MemoryStore::open(blocker.join("memories.json")).unwrap_err();
        assert!(matches!(err, MemoryError::Storage { .. }));
    }

    #[test]
    fn test_ids_are_global_across_sessions() {
        let (_dir, store) = temp_store();

        let a = store.append("s1", "note", "first", vec![]).unwrap();
        let b = store.append("s2", "note", "second", vec![]).unwrap();
        let c = store.append("s1", "note", "third", vec![]).unwrap();

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    }

    #[test]
    fn test_next_id_follows_max_not_count() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"[{"id":7,"session_id":"s","type":"note","content":"old","created_at":"2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let note = store.append("s", "note", "new", vec![]).unwrap();
        assert_eq!(note.id, 8);
    }

    #[test]
    fn test_duplicate_content_is_allowed() {
        let (_dir, store) = temp_store();
        store.append("s", "note", "same", vec![]).unwrap();
        store.append("s", "note", "same", vec![]).unwrap();
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_append_draft_keeps_supervised_fields() {
        let (_dir, store) = temp_store();
        let draft = MemoryDraft::new("correction", "use React Query")
            .with_tags(["react-query"])
            .with_input("fetch users")
            .with_ideal_output("Always fetch via React Query")
            .with_reason("project convention");

        store.append_draft("s1", draft).unwrap();

        let notes = store.list();
        assert_eq!(notes[0].kind, "correction");
        assert_eq!(notes[0].tags, vec!["react-query"]);
        assert_eq!(notes[0].input.as_deref(), Some("fetch users"));
        assert_eq!(
            notes[0].ideal_output.as_deref(),
            Some("Always fetch via React Query")
        );
        assert_eq!(notes[0].reason.as_deref(), Some("project convention"));
    }

    #[test]
    fn test_validation_rejects_before_mutation() {
        let (_dir, store) = temp_store();

        let err = store.append("s", "note", "   ", vec![]).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::Validation(ValidationError::EmptyContent)
        ));
        let err = store.append("", "note", "content", vec![]).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::Validation(ValidationError::EmptySessionId)
        ));

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn test_query_filters_session_and_case() {
        let (_dir, store) = temp_store();
        store.append("s1", "preference", "Prefer Tailwind CSS", vec![]).unwrap();
        store.append("s2", "preference", "Prefer tailwind too", vec![]).unwrap();
        store.append("s1", "preference", "Use pnpm", vec![]).unwrap();

        let notes = store.query_relevant("s1", "TAILWIND", 5);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "Prefer Tailwind CSS");
    }

    #[test]
    fn test_query_orders_most_recent_first_and_truncates() {
        let (_dir, store) = temp_store();
        for i in 0..4 {
            store
                .append("s1", "note", &format!("layout rule {i}"), vec![])
                .unwrap();
        }

        let notes = store.query_relevant("s1", "layout", 3);
        assert_eq!(notes.len(), 3);
        let ids: Vec<_> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
        assert!(
            notes
                .windows(2)
                .all(|w| w[0].created_at >= w[1].created_at)
        );
    }

    #[test]
    fn test_query_on_corrupted_collection_is_empty() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.query_relevant("s1", "", 5).is_empty());
    }

    #[test]
    fn test_query_on_missing_collection_is_empty() {
        let (_dir, store) = temp_store();
        fs::remove_file(store.path()).unwrap();
        assert!(store.query_relevant("s1", "", 5).is_empty());
    }

    #[test]
    fn test_append_refuses_to_overwrite_corrupted_collection() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.append("s", "note", "content", vec![]).unwrap_err();
        assert!(matches!(err, MemoryError::Corrupted { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_malformed_entries_skipped_on_read_but_preserved_on_write() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"[{"id":1,"session_id":"s","type":"note","content":"ok","created_at":"2025-01-01T00:00:00Z"},{"id":2,"garbage":true}]"#,
        )
        .unwrap();

        assert_eq!(store.list().len(), 1);

        let note = store.append("s", "note", "next", vec![]).unwrap();
        assert_eq!(note.id, 3);

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw.as_array().unwrap().len(), 3);
        assert_eq!(raw[1]["garbage"], true);
    }

    #[test]
    fn test_concurrent_appends_get_distinct_ids() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..5)
                        .map(|i| {
                            store
                                .append(&format!("s{t}"), "note", &format!("n{i}"), vec![])
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: BTreeSet<NoteId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(ids, (1..=40).collect());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: N sequential appends yield exactly ids 1..=N, whatever the sessions.
        #[test]
        fn sequential_appends_number_from_one(sessions in prop::collection::vec(0u8..4, 1..12)) {
            let (_dir, store) = temp_store();
            let ids: Vec<NoteId> = sessions
                .iter()
                .map(|s| store.append(&format!("s{s}"), "note", "content", vec![]).unwrap().id)
                .collect();
            let expected: Vec<NoteId> = (1..=sessions.len() as NoteId).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
