//! GitHub payload normalization.
//!
//! Consumes already-fetched GitHub REST payloads (repository info, issue
//! listings, pull-request listings) and produces records with deterministic
//! ids and bounded text. Fetching is someone else's job; a payload that
//! does not parse comes back as an explicit error, never a panic.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use storyloom_core::defaults::{INGEST_BODY_MAX_CHARS, INGEST_ITEM_LIMIT, INGEST_README_MAX_CHARS};
use storyloom_core::{truncate_chars, Record, Result};

/// Repository info payload, as returned by `GET /repos/{owner}/{repo}`
/// (plus an optional pre-fetched README).
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct IssueLabel {
    #[serde(default)]
    name: String,
}

/// One entry of an issue listing payload.
///
/// GitHub mixes pull requests into issue listings; entries carrying a
/// `pull_request` stub are dropped during issue normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    labels: Vec<IssueLabel>,
    #[serde(default)]
    pull_request: Option<JsonValue>,
}

/// One entry of a pull-request listing payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
}

/// Normalize a repository-info payload into one record.
pub fn normalize_repository(owner: &str, repo: &str, payload: &JsonValue) -> Result<Record> {
    let info: RepositoryInfo = serde_json::from_value(payload.clone())?;

    let text = format!(
        "Repository: {}/{}\nDescription: {}\nLanguage: {}\nREADME: {}",
        owner,
        repo,
        info.description.as_deref().unwrap_or(""),
        info.language.as_deref().unwrap_or(""),
        truncate_chars(info.readme.as_deref().unwrap_or(""), INGEST_README_MAX_CHARS),
    );

    Ok(Record::new(
        format!("repo_{}_{}", owner, repo),
        text,
        json!({
            "type": "repository",
            "owner": owner,
            "name": repo,
        }),
    ))
}

/// Normalize an issue-listing payload into records.
///
/// Keeps at most [`INGEST_ITEM_LIMIT`] true issues; pull-request entries in
/// the listing are skipped. Items without a number fall back to their list
/// position so the id stays deterministic for the same payload.
pub fn normalize_issues(owner: &str, repo: &str, payload: &JsonValue) -> Result<Vec<Record>> {
    let issues: Vec<Issue> = serde_json::from_value(payload.clone())?;

    let records = issues
        .into_iter()
        .filter(|issue| issue.pull_request.is_none())
        .take(INGEST_ITEM_LIMIT)
        .enumerate()
        .map(|(i, issue)| {
            let number = issue.number.unwrap_or(i as u64);
            let labels: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
            let text = format!(
                "Issue #{}: {}\nState: {}\nBody: {}\nLabels: {}",
                number,
                issue.title,
                issue.state,
                truncate_chars(issue.body.as_deref().unwrap_or(""), INGEST_BODY_MAX_CHARS),
                labels.join(", "),
            );
            Record::new(
                format!("issue_{}_{}_{}", owner, repo, number),
                text,
                json!({
                    "type": "issue",
                    "repo_owner": owner,
                    "repo_name": repo,
                    "number": number,
                    "state": issue.state,
                }),
            )
        })
        .collect::<Vec<_>>();

    debug!(owner, repo, result_count = records.len(), "issues normalized");
    Ok(records)
}

/// Normalize a pull-request listing payload into records.
pub fn normalize_pull_requests(
    owner: &str,
    repo: &str,
    payload: &JsonValue,
) -> Result<Vec<Record>> {
    let prs: Vec<PullRequest> = serde_json::from_value(payload.clone())?;

    let records = prs
        .into_iter()
        .take(INGEST_ITEM_LIMIT)
        .enumerate()
        .map(|(i, pr)| {
            let number = pr.number.unwrap_or(i as u64);
            let text = format!(
                "Pull request #{}: {}\nState: {}\nBody: {}",
                number,
                pr.title,
                pr.state,
                truncate_chars(pr.body.as_deref().unwrap_or(""), INGEST_BODY_MAX_CHARS),
            );
            Record::new(
                format!("pr_{}_{}_{}", owner, repo, number),
                text,
                json!({
                    "type": "pull_request",
                    "repo_owner": owner,
                    "repo_name": repo,
                    "number": number,
                    "state": pr.state,
                }),
            )
        })
        .collect::<Vec<_>>();

    debug!(owner, repo, result_count = records.len(), "pull requests normalized");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_repository() {
        let payload = json!({
            "description": "An online shop",
            "language": "Rust",
            "readme": "# Shop\nHow to run..."
        });

        let record = normalize_repository("acme", "shop", &payload).unwrap();
        assert_eq!(record.id, "repo_acme_shop");
        assert!(record.text.contains("Repository: acme/shop"));
        assert!(record.text.contains("Language: Rust"));
        assert_eq!(record.metadata["type"], "repository");
    }

    #[test]
    fn test_normalize_repository_truncates_readme() {
        let payload = json!({"readme": "x".repeat(5000)});
        let record = normalize_repository("acme", "shop", &payload).unwrap();
        let readme_line = record.text.lines().last().unwrap();
        assert!(readme_line.chars().count() <= "README: ".len() + INGEST_README_MAX_CHARS);
    }

    #[test]
    fn test_normalize_repository_tolerates_missing_fields() {
        let record = normalize_repository("acme", "shop", &json!({})).unwrap();
        assert_eq!(record.id, "repo_acme_shop");
        assert!(record.text.contains("Description: \n"));
    }

    #[test]
    fn test_normalize_issues() {
        let payload = json!([
            {
                "number": 12,
                "title": "Implement OAuth2 authentication",
                "body": "We need login via OAuth2.",
                "state": "open",
                "labels": [{"name": "security"}, {"name": "backend"}]
            },
            {
                "number": 13,
                "title": "Fix typo",
                "state": "closed"
            }
        ]);

        let records = normalize_issues("acme", "shop", &payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "issue_acme_shop_12");
        assert!(records[0].text.contains("Issue #12: Implement OAuth2 authentication"));
        assert!(records[0].text.contains("Labels: security, backend"));
        assert_eq!(records[0].metadata["number"], 12);
        assert_eq!(records[1].metadata["state"], "closed");
    }

    #[test]
    fn test_normalize_issues_skips_pull_request_entries() {
        let payload = json!([
            {"number": 1, "title": "Real issue", "state": "open"},
            {"number": 2, "title": "A PR", "state": "open", "pull_request": {"url": "..."}}
        ]);

        let records = normalize_issues("acme", "shop", &payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "issue_acme_shop_1");
    }

    #[test]
    fn test_normalize_issues_caps_item_count() {
        let issues: Vec<JsonValue> = (0..25)
            .map(|i| json!({"number": i, "title": format!("Issue {}", i), "state": "open"}))
            .collect();

        let records = normalize_issues("acme", "shop", &json!(issues)).unwrap();
        assert_eq!(records.len(), INGEST_ITEM_LIMIT);
    }

    #[test]
    fn test_normalize_issues_same_payload_same_ids() {
        let payload = json!([{"number": 7, "title": "Stable", "state": "open"}]);

        let first = normalize_issues("acme", "shop", &payload).unwrap();
        let second = normalize_issues("acme", "shop", &payload).unwrap();
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn test_normalize_issues_rejects_malformed_payload() {
        let err = normalize_issues("acme", "shop", &json!({"not": "a list"})).unwrap_err();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_normalize_pull_requests() {
        let payload = json!([
            {"number": 5, "title": "Add cache", "body": "Speeds things up", "state": "open"}
        ]);

        let records = normalize_pull_requests("acme", "shop", &payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "pr_acme_shop_5");
        assert_eq!(records[0].metadata["type"], "pull_request");
    }

    #[test]
    fn test_normalize_issues_truncates_long_bodies() {
        let payload = json!([
            {"number": 1, "title": "Long", "body": "b".repeat(4000), "state": "open"}
        ]);

        let records = normalize_issues("acme", "shop", &payload).unwrap();
        let body_line = records[0]
            .text
            .lines()
            .find(|l| l.starts_with("Body:"))
            .unwrap();
        assert!(body_line.chars().count() <= "Body: ".len() + INGEST_BODY_MAX_CHARS);
    }
}
