//! Rally payload normalization.
//!
//! Consumes already-fetched Rally Web Services query results (user stories,
//! features, defects) and produces records with deterministic ids keyed by
//! the Rally `FormattedID`. Items without a `FormattedID` are skipped — an
//! id invented here would break overwrite-on-reingest.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use storyloom_core::defaults::{INGEST_BODY_MAX_CHARS, INGEST_ITEM_LIMIT};
use storyloom_core::{truncate_chars, Record, Result};

#[derive(Debug, Clone, Deserialize)]
struct IterationRef {
    #[serde(rename = "Name", default)]
    name: String,
}

/// One Rally work item, as returned in `QueryResult.Results`.
///
/// The same shape covers hierarchical requirements (user stories),
/// portfolio items (features), and defects; `Severity` is only present on
/// defects.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    #[serde(rename = "FormattedID", default)]
    pub formatted_id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ScheduleState", default)]
    pub schedule_state: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Iteration", default)]
    iteration: Option<IterationRef>,
    #[serde(rename = "Severity", default)]
    pub severity: Option<String>,
}

impl WorkItem {
    /// Stories carry `ScheduleState`, features and defects carry `State`.
    fn display_state(&self) -> &str {
        self.schedule_state
            .as_deref()
            .or(self.state.as_deref())
            .unwrap_or("")
    }
}

/// Kinds of Rally work items the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemKind {
    UserStory,
    Feature,
    Defect,
}

impl WorkItemKind {
    fn id_prefix(&self) -> &'static str {
        match self {
            WorkItemKind::UserStory => "story",
            WorkItemKind::Feature => "feature",
            WorkItemKind::Defect => "defect",
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            WorkItemKind::UserStory => "user_story",
            WorkItemKind::Feature => "feature",
            WorkItemKind::Defect => "defect",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            WorkItemKind::UserStory => "Story",
            WorkItemKind::Feature => "Feature",
            WorkItemKind::Defect => "Defect",
        }
    }
}

/// Normalize one Rally work-item listing payload into records.
///
/// `payload` is the `Results` array of a Rally query. Keeps at most
/// [`INGEST_ITEM_LIMIT`] items.
pub fn normalize_work_items(kind: WorkItemKind, payload: &JsonValue) -> Result<Vec<Record>> {
    let items: Vec<WorkItem> = serde_json::from_value(payload.clone())?;

    let mut records = Vec::new();
    for item in items.into_iter().take(INGEST_ITEM_LIMIT) {
        let Some(formatted_id) = item.formatted_id.clone().filter(|id| !id.is_empty()) else {
            warn!(name = %item.name, "work item without FormattedID skipped");
            continue;
        };

        let mut text = format!(
            "{} {}: {}\nState: {}\nDescription: {}",
            kind.label(),
            formatted_id,
            item.name,
            item.display_state(),
            truncate_chars(
                item.description.as_deref().unwrap_or(""),
                INGEST_BODY_MAX_CHARS
            ),
        );
        if let Some(iteration) = &item.iteration {
            text.push_str(&format!("\nIteration: {}", iteration.name));
        }
        if let Some(severity) = &item.severity {
            text.push_str(&format!("\nSeverity: {}", severity));
        }

        let mut metadata = json!({
            "type": kind.type_tag(),
            "formatted_id": formatted_id,
            "state": item.display_state(),
        });
        if let Some(severity) = &item.severity {
            metadata["severity"] = json!(severity);
        }

        records.push(Record::new(
            format!("{}_{}", kind.id_prefix(), formatted_id),
            text,
            metadata,
        ));
    }

    debug!(kind = ?kind, result_count = records.len(), "work items normalized");
    Ok(records)
}

/// Normalize a user-story listing.
pub fn normalize_stories(payload: &JsonValue) -> Result<Vec<Record>> {
    normalize_work_items(WorkItemKind::UserStory, payload)
}

/// Normalize a feature listing.
pub fn normalize_features(payload: &JsonValue) -> Result<Vec<Record>> {
    normalize_work_items(WorkItemKind::Feature, payload)
}

/// Normalize a defect listing.
pub fn normalize_defects(payload: &JsonValue) -> Result<Vec<Record>> {
    normalize_work_items(WorkItemKind::Defect, payload)
}
