//! Full flow: normalize tracker payloads, ingest, search, generate.

use std::sync::Arc;

use serde_json::json;

use storyloom_connect::{normalize_issues, normalize_stories};
use storyloom_core::{Collection, GenerationRequest, SearchScope, SourceContext};
use storyloom_inference::{MockEmbeddingBackend, MockGenerationService};
use storyloom_pipeline::{PipelineConfig, StoryService};
use storyloom_store::{ContextStore, MemoryIndex};

fn service(generation: MockGenerationService) -> StoryService {
    let store = Arc::new(ContextStore::new(
        Arc::new(MemoryIndex::new()),
        Arc::new(MockEmbeddingBackend::new()),
    ));
    let config = PipelineConfig {
        model_chain: vec!["llama3.2:1b".to_string()],
    };
    StoryService::new(store, Arc::new(generation), config)
}

#[tokio::test]
async fn ingested_issue_is_findable_and_feeds_generation() {
    let generation = MockGenerationService::new().with_response("llama3.2:1b", "drafted story");
    let service = service(generation.clone());
    service.initialize().await;

    // ingest a fetched issue listing through the adapter
    let payload = json!([
        {
            "number": 12,
            "title": "Implement OAuth2 authentication",
            "body": "Support login via corporate identity provider.",
            "state": "open",
            "labels": [{"name": "security"}]
        }
    ]);
    let records = normalize_issues("acme", "shop", &payload).unwrap();
    assert!(service.add_context(Collection::GithubData, records).await);

    // the search surface finds it by a related query
    let hits = service
        .search(
            "authentication login",
            SearchScope::One(Collection::GithubData),
            5,
        )
        .await;
    assert!(!hits.is_empty());
    assert!(hits.iter().any(|h| {
        h.metadata.get("number").and_then(|v| v.as_u64()) == Some(12)
    }));

    // generation pulls that history into the enriched prompt
    let story = service
        .generate_story(GenerationRequest::new("improve the authentication flow"))
        .await
        .unwrap();
    assert_eq!(story.text, "drafted story");

    let calls = generation.calls();
    let prompt = &calls
        .iter()
        .find(|c| c.operation == "generate")
        .unwrap()
        .input;
    assert!(prompt.contains("RELATED HISTORY:"));
    assert!(prompt.contains("[github_data]"));
    assert!(prompt.contains("OAuth2"));
}

#[tokio::test]
async fn rally_records_ride_along_as_fresh_context() {
    let generation = MockGenerationService::new().with_response("llama3.2:1b", "drafted story");
    let service = service(generation.clone());
    service.initialize().await;

    let payload = json!([
        {
            "FormattedID": "US1234",
            "Name": "Search filters on product list",
            "ScheduleState": "Defined",
            "Description": "Filter by category and price."
        }
    ]);
    let mut context = SourceContext::new();
    context.insert("rally".to_string(), normalize_stories(&payload).unwrap());

    service
        .generate_story(GenerationRequest::new("extend the product list").with_context(context))
        .await
        .unwrap();

    // fresh context appears in the prompt and lands in its collection
    let calls = generation.calls();
    let prompt = &calls
        .iter()
        .find(|c| c.operation == "generate")
        .unwrap()
        .input;
    assert!(prompt.contains("FRESH SOURCE DATA:"));
    assert!(prompt.contains("[rally] 1 records:"));
    assert!(prompt.contains("Story US1234"));

    let stats = service.get_stats().await;
    assert_eq!(stats.get("rally_data"), Some(&1));
}

#[tokio::test]
async fn reingesting_fetched_payload_does_not_duplicate() {
    let generation = MockGenerationService::new();
    let service = service(generation);
    service.initialize().await;

    let payload = json!([
        {"number": 5, "title": "One issue", "state": "open"}
    ]);
    for _ in 0..3 {
        let records = normalize_issues("acme", "shop", &payload).unwrap();
        service.add_context(Collection::GithubData, records).await;
    }

    assert_eq!(service.get_stats().await.get("github_data"), Some(&1));
}
