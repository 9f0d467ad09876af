//! Sample extraction and dataset output.

use std::path::{Path, PathBuf};

use ajar_memory::load_notes;
use ajar_transcript::TranscriptScan;
use ajar_types::fs::write_atomic;
use ajar_types::{DatasetSample, MemoryNote, Rating, Role, SampleSource, TranscriptRecord};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::error::{DatasetError, Result};
use crate::normalize::normalize_whitespace;

/// Fallback instruction when neither config nor caller provides one.
pub const DEFAULT_FALLBACK_INSTRUCTION: &str =
    "Revise the following answer to match the project's preferences.";

/// Samples extracted from the stores, in output order.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub samples: Vec<DatasetSample>,
    pub memory_samples: usize,
    pub log_samples: usize,
    /// Entries dropped for missing or empty fields (each one logged).
    pub skipped: usize,
    /// Transcripts not rated `good`.
    pub ineligible: usize,
}

/// Summary of a build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub sample_count: usize,
    pub memory_samples: usize,
    pub log_samples: usize,
    pub skipped: usize,
    pub ineligible: usize,
    /// Where the dataset was written; `None` when nothing was produced.
    pub output: Option<PathBuf>,
}

/// Reads the memory collection and transcript log; owns the output file.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    memory_path: PathBuf,
    log_path: PathBuf,
    output_path: PathBuf,
    fallback_instruction: String,
}

impl DatasetBuilder {
    pub fn new(
        memory_path: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            memory_path: memory_path.into(),
            log_path: log_path.into(),
            output_path: output_path.into(),
            fallback_instruction: DEFAULT_FALLBACK_INSTRUCTION.to_string(),
        }
    }

    /// Instruction used for memory notes whose content is empty.
    pub fn with_fallback_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.fallback_instruction = instruction.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Extract every eligible sample without writing anything.
    pub fn collect(&self) -> Collected {
        let mut collected = Collected::default();

        let notes = load_notes(&self.memory_path);
        debug!(count = notes.len(), path = %self.memory_path.display(), "Loaded memory notes");
        for note in &notes {
            match self.sample_from_memory(note) {
                Some(sample) => {
                    collected.samples.push(sample);
                    collected.memory_samples += 1;
                }
                None => collected.skipped += 1,
            }
        }

        for record in TranscriptScan::open(&self.log_path) {
            if record.rating != Some(Rating::Good) {
                collected.ineligible += 1;
                continue;
            }
            match sample_from_log(&record) {
                Some(sample) => {
                    collected.samples.push(sample);
                    collected.log_samples += 1;
                }
                None => collected.skipped += 1,
            }
        }

        collected
    }

    /// Regenerate the dataset file.
    ///
    /// With zero samples nothing is written and the previous dataset, if any,
    /// is kept. Otherwise the file is replaced wholesale.
    pub fn build(&self) -> Result<BuildReport> {
        info!(
            memories = %self.memory_path.display(),
            logs = %self.log_path.display(),
            "Building dataset"
        );
        let collected = self.collect();

        let mut report = BuildReport {
            sample_count: collected.samples.len(),
            memory_samples: collected.memory_samples,
            log_samples: collected.log_samples,
            skipped: collected.skipped,
            ineligible: collected.ineligible,
            output: None,
        };

        if collected.samples.is_empty() {
            warn!("No samples generated, nothing to write");
            return Ok(report);
        }

        let mut contents = String::new();
        for sample in &collected.samples {
            contents.push_str(&serde_json::to_string(sample)?);
            contents.push('\n');
        }

        write_atomic(&self.output_path, contents.as_bytes()).map_err(|source| {
            DatasetError::Write {
                path: self.output_path.clone(),
                source,
            }
        })?;

        info!(
            samples = report.sample_count,
            memory = report.memory_samples,
            log = report.log_samples,
            skipped = report.skipped,
            path = %self.output_path.display(),
            "Dataset written"
        );
        report.output = Some(self.output_path.clone());
        Ok(report)
    }

    fn sample_from_memory(&self, note: &MemoryNote) -> Option<DatasetSample> {
        let output = normalize_whitespace(note.ideal_output.as_deref().unwrap_or_default());
        if output.is_empty() {
            warn!(memory_id = note.id, "Memory note has no ideal_output, skip");
            return None;
        }

        let content = normalize_whitespace(&note.content);
        let instruction = if content.is_empty() {
            self.fallback_instruction.clone()
        } else {
            content
        };

        let mut meta = Map::new();
        meta.insert("type".to_string(), Value::String(note.kind.clone()));
        meta.insert(
            "reason".to_string(),
            Value::String(note.reason.clone().unwrap_or_default()),
        );

        Some(DatasetSample {
            id: format!("mem-{}", note.id),
            source: SampleSource::Memory,
            session_id: note.session_id.clone(),
            instruction,
            input: normalize_whitespace(note.input.as_deref().unwrap_or_default()),
            output,
            rating: None,
            comment: None,
            tags: Some(note.tags.clone()),
            created_at: Some(note.created_at),
            meta,
        })
    }
}

/// Content of the last message with `role`, normalized; `None` if absent or empty.
fn last_message(record: &TranscriptRecord, role: Role) -> Option<String> {
    record
        .messages
        .iter()
        .rev()
        .find(|m| m.role == role)
        .map(|m| normalize_whitespace(&m.content))
        .filter(|content| !content.is_empty())
}

fn sample_from_log(record: &TranscriptRecord) -> Option<DatasetSample> {
    let Some(instruction) = last_message(record, Role::User) else {
        warn!(log_id = %record.id, "Transcript has no usable user message, skip");
        return None;
    };
    let Some(output) = last_message(record, Role::Assistant) else {
        warn!(log_id = %record.id, "Transcript has no usable assistant message, skip");
        return None;
    };

    let mut meta = Map::new();
    meta.insert("model".to_string(), Value::String(record.model.clone()));
    meta.insert("log_source".to_string(), Value::String(record.source.clone()));
    meta.insert("used_memory_ids".to_string(), json!(record.used_memory_ids));

    Some(DatasetSample {
        id: format!("log-{}", record.id),
        source: SampleSource::Log,
        session_id: record.session_id.clone(),
        instruction,
        input: String::new(),
        output,
        rating: Some(Rating::Good),
        comment: record
            .feedback_comment
            .clone()
            .filter(|c| !c.is_empty()),
        tags: None,
        created_at: Some(record.created_at),
        meta,
    })
}
