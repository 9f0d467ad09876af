//! Append-only JSONL transcript log and its tolerant scanner.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use ajar_types::TranscriptRecord;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::TranscriptError;

/// Append-only JSONL transcript log. One record per line.
///
/// Appends and feedback rewrites on the same handle are serialized by an
/// internal lock. Scans take no lock.
#[derive(Debug)]
pub struct TranscriptLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TranscriptLog {
    /// Open the log, creating its directory and an empty file if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_parent(&path)?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TranscriptError::Storage {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), "Transcript log opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Handle on a log that may not exist yet. Nothing is created until the
    /// first append.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the end of the log.
    pub fn append(&self, record: &TranscriptRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        ensure_parent(&self.path)?;

        let storage_err = |source: std::io::Error| TranscriptError::Storage {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(storage_err)?;
        file.write_all(line.as_bytes()).map_err(storage_err)?;
        // Ensure data is persisted to disk before returning success
        file.sync_all().map_err(storage_err)?;

        debug!(
            id = %record.id,
            session_id = %record.session_id,
            source = %record.source,
            "Appended transcript record"
        );
        Ok(())
    }

    /// Lazily read the log record by record.
    ///
    /// Lines that fail to parse are skipped with a warning; a missing file
    /// scans as empty.
    pub fn scan(&self) -> TranscriptScan {
        TranscriptScan::open(&self.path)
    }

    /// Collect every parseable record.
    pub fn read_all(&self) -> Vec<TranscriptRecord> {
        self.scan().collect()
    }

    /// Records belonging to one session, in log order.
    pub fn read_for_session(&self, session_id: &str) -> Vec<TranscriptRecord> {
        self.scan()
            .filter(|r| r.session_id == session_id)
            .collect()
    }

    pub(crate) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| TranscriptError::Storage {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Iterator over the records of a transcript log file.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 is just
/// another malformed line.
pub struct TranscriptScan {
    reader: Option<BufReader<File>>,
    buf: Vec<u8>,
    line_no: usize,
    skipped: usize,
}

impl TranscriptScan {
    /// Scan an arbitrary log file.
    pub fn open(path: &Path) -> Self {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Transcript log not found, nothing to scan");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open transcript log");
                None
            }
        };
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for TranscriptScan {
    type Item = TranscriptRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        loop {
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(line = self.line_no + 1, error = %e, "Transcript read failed, stopping scan");
                    self.reader = None;
                    return None;
                }
            }
            self.line_no += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<TranscriptRecord>(&self.buf) {
                Ok(record) => return Some(record),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "Skipping malformed transcript line");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajar_types::{ChatMessage, Rating};

    fn temp_log() -> (tempfile::TempDir, TranscriptLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = TranscriptLog::open(dir.path().join("data").join("logs.jsonl")).unwrap();
        (dir, log)
    }

    fn record(id: &str, session: &str) -> TranscriptRecord {
        TranscriptRecord::new(
            session,
            "qwen2.5-coder:3b",
            vec![
                ChatMessage::system("be helpful"),
                ChatMessage::user("build a button"),
                ChatMessage::assistant("<button/>"),
            ],
            "test",
        )
        .with_id(id)
    }

    #[test]
    fn test_open_creates_empty_file() {
        let (_dir, log) = temp_log();
        assert!(log.path().exists());
        assert_eq!(fs::metadata(log.path()).unwrap().len(), 0);
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn test_append_then_scan_roundtrip() {
        let (_dir, log) = temp_log();
        log.append(&record("s1-1", "s1")).unwrap();

        let last = record("s1-2", "s1").with_used_memory_ids(vec![3, 1]);
        log.append(&last).unwrap();

        let all = log.read_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all.last().unwrap(), &last);
    }

    #[test]
    fn test_one_line_per_record() {
        let (_dir, log) = temp_log();
        log.append(&record("a", "s")).unwrap();
        log.append(&record("b", "s")).unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn test_append_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.jsonl");

        TranscriptLog::open(&path).unwrap().append(&record("a", "s")).unwrap();
        TranscriptLog::open(&path).unwrap().append(&record("b", "s")).unwrap();

        let ids: Vec<_> = TranscriptLog::open(&path)
            .unwrap()
            .read_all()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_scan_skips_malformed_and_blank_lines() {
        let (_dir, log) = temp_log();
        log.append(&record("a", "s")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            file.write_all(b"{not json\n\n{\"id\":\"no-fields\"}\n").unwrap();
        }
        log.append(&record("b", "s").with_rating(Rating::Good)).unwrap();

        let mut scan = log.scan();
        let ids: Vec<_> = scan.by_ref().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(scan.skipped(), 2);
    }

    #[test]
    fn test_scan_skips_invalid_utf8_line() {
        let (_dir, log) = temp_log();
        log.append(&record("a", "s")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            file.write_all(b"{\"id\":\"\xff\xfe\"}\n").unwrap();
        }
        log.append(&record("b", "s")).unwrap();

        let mut scan = log.scan();
        let ids: Vec<_> = scan.by_ref().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(scan.skipped(), 1);
    }

    #[test]
    fn test_scan_reads_final_line_without_newline() {
        let (_dir, log) = temp_log();
        log.append(&record("a", "s")).unwrap();
        let line = serde_json::to_string(&record("b", "s")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            file.write_all(line.as_bytes()).unwrap();
        }

        let ids: Vec<_> = log.read_all().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_concurrent_appends_keep_whole_lines() {
        use std::sync::Arc;

        let (_dir, log) = temp_log();
        let log = Arc::new(log);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(&record(&format!("t{t}-{i}"), "s")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut scan = log.scan();
        let records: Vec<_> = scan.by_ref().collect();
        assert_eq!(scan.skipped(), 0);
        assert_eq!(records.len(), 200);

        // Per-thread order is preserved.
        for t in 0..8 {
            let prefix = format!("t{t}-");
            let seen: Vec<_> = records
                .iter()
                .filter(|r| r.id.starts_with(&prefix))
                .map(|r| r.id.clone())
                .collect();
            let expected: Vec<_> = (0..25).map(|i| format!("t{t}-{i}")).collect();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn test_at_creates_nothing_until_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs.jsonl");
        let log = TranscriptLog::at(&path);

        assert!(log.read_all().is_empty());
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());

        log.append(&record("a", "s")).unwrap();
        assert_eq!(log.read_all().len(), 1);
    }

    #[test]
    fn test_scan_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(TranscriptScan::open(&dir.path().join("absent.jsonl")).count(), 0);
    }

    #[test]
    fn test_read_for_session() {
        let (_dir, log) = temp_log();
        log.append(&record("a", "s1")).unwrap();
        log.append(&record("b", "s2")).unwrap();
        log.append(&record("c", "s1")).unwrap();

        let ids: Vec<_> = log.read_for_session("s1").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(log.read_for_session("nope").is_empty());
    }
}
