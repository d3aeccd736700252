use crate::error::{EventPrintError, Result};
use crate::logic::{aggregate, aggregate_submissions, Evaluator};
use crate::models::{AggregateResult, Event, SegmentRecord, Submission, SubmissionRecord};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Input for an event report.
///
/// Either rows as a store keeps them (footprints already computed) or full
/// submissions whose footprints are computed on load. A document with a
/// top-level `segments` list is read as stored rows.
#[derive(Debug, Clone)]
pub enum ReportInput {
    Stored {
        event: Option<Event>,
        submissions: Vec<SubmissionRecord>,
        segments: Vec<SegmentRecord>,
    },
    Full {
        event: Option<Event>,
        submissions: Vec<Submission>,
    },
}

#[derive(Deserialize)]
struct DocumentShape {
    #[serde(default)]
    segments: Option<IgnoredAny>,
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    event: Option<Event>,
    submissions: Vec<SubmissionRecord>,
    segments: Vec<SegmentRecord>,
}

#[derive(Deserialize)]
struct FullDocument {
    #[serde(default)]
    event: Option<Event>,
    submissions: Vec<Submission>,
}

impl ReportInput {
    pub fn event(&self) -> Option<&Event> {
        match self {
            ReportInput::Stored { event, .. } | ReportInput::Full { event, .. } => event.as_ref(),
        }
    }

    pub fn submission_count(&self) -> usize {
        match self {
            ReportInput::Stored { submissions, .. } => submissions.len(),
            ReportInput::Full { submissions, .. } => submissions.len(),
        }
    }

    pub fn aggregate(&self, evaluator: &Evaluator<'_>) -> AggregateResult {
        match self {
            ReportInput::Stored {
                submissions,
                segments,
                ..
            } => aggregate(submissions, segments),
            ReportInput::Full { submissions, .. } => aggregate_submissions(evaluator, submissions),
        }
    }
}

pub fn load_submission(path: &Path) -> Result<Submission> {
    load_document(path)
}

pub fn load_report_input(path: &Path) -> Result<ReportInput> {
    if !path.exists() {
        return Err(EventPrintError::NotFound(format!("{}", path.display())));
    }

    let content = std::fs::read_to_string(path)?;
    let input = parse_report_input(&content, is_yaml(path))?;
    info!(
        path = %path.display(),
        submissions = input.submission_count(),
        "Loaded report input"
    );
    Ok(input)
}

/// Reads a JSON document, or YAML when the extension says so.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(EventPrintError::NotFound(format!("{}", path.display())));
    }

    let content = std::fs::read_to_string(path)?;
    parse_document(&content, is_yaml(path))
}

/// Picks the document layout first so a malformed row reports its own field error.
fn parse_report_input(content: &str, yaml: bool) -> Result<ReportInput> {
    let shape: DocumentShape = parse_document(content, yaml)?;

    let input = if shape.segments.is_some() {
        let doc: StoredDocument = parse_document(content, yaml)?;
        ReportInput::Stored {
            event: doc.event,
            submissions: doc.submissions,
            segments: doc.segments,
        }
    } else {
        let doc: FullDocument = parse_document(content, yaml)?;
        ReportInput::Full {
            event: doc.event,
            submissions: doc.submissions,
        }
    };

    Ok(input)
}

fn parse_document<T: DeserializeOwned>(content: &str, yaml: bool) -> Result<T> {
    if yaml {
        Ok(serde_yaml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
