//! End-to-end pipeline behavior over mock backends.

use std::sync::Arc;

use serde_json::json;

use storyloom_core::{Collection, GenerationRequest, Record, SearchScope, SourceContext};
use storyloom_inference::{MockEmbeddingBackend, MockGenerationService};
use storyloom_pipeline::{AttemptOutcome, PipelineConfig, StoryOrigin, StoryService};
use storyloom_store::{ContextStore, MemoryIndex};

fn store() -> Arc<ContextStore> {
    Arc::new(ContextStore::new(
        Arc::new(MemoryIndex::new()),
        Arc::new(MockEmbeddingBackend::new()),
    ))
}

fn service_with(generation: MockGenerationService, chain: &[&str]) -> StoryService {
    let config = PipelineConfig {
        model_chain: chain.iter().map(|m| m.to_string()).collect(),
    };
    StoryService::new(store(), Arc::new(generation), config)
}

#[tokio::test]
async fn story_comes_from_first_usable_backend() {
    let generation = MockGenerationService::new().with_response("b2", "Story drafted by B2");
    let service = service_with(generation, &["b1", "b2"]);
    service.initialize().await;

    let story = service
        .generate_story(GenerationRequest::new("add search filters"))
        .await
        .unwrap();

    assert_eq!(story.text, "Story drafted by B2");
    assert_eq!(story.origin, StoryOrigin::Backend("b2".to_string()));
    assert_eq!(story.attempts.len(), 2);
    assert_eq!(story.attempts[0].outcome, AttemptOutcome::SkippedNotReady);
    assert_eq!(story.attempts[1].outcome, AttemptOutcome::Succeeded);

    // the result is persisted with has_context=false
    let stats = service.get_stats().await;
    assert_eq!(stats.get("generated_stories"), Some(&1));

    let hits = service
        .search(
            "Story drafted",
            SearchScope::One(Collection::GeneratedStories),
            5,
        )
        .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits[0].metadata.get("has_context").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        hits[0].metadata.get("origin").and_then(|v| v.as_str()),
        Some("backend:b2")
    );
}

#[tokio::test]
async fn failed_invocation_falls_through_to_next_backend() {
    let generation = MockGenerationService::new()
        .with_failing_model("b1")
        .with_response("b2", "recovered");
    let service = service_with(generation, &["b1", "b2"]);
    service.initialize().await;

    let story = service
        .generate_story(GenerationRequest::new("add search filters"))
        .await
        .unwrap();

    assert_eq!(story.text, "recovered");
    assert_eq!(story.attempts[0].outcome, AttemptOutcome::Failed);
    assert_eq!(story.attempts[1].outcome, AttemptOutcome::Succeeded);
}

#[tokio::test]
async fn template_fallback_when_every_backend_is_down() {
    let generation = MockGenerationService::new().with_available(false);
    let service = service_with(generation, &["b1", "b2"]);
    service.initialize().await;

    let story = service
        .generate_story(GenerationRequest::new("add search filters"))
        .await
        .unwrap();

    assert!(!story.text.is_empty());
    assert_eq!(story.origin, StoryOrigin::Template);
    assert!(story.text.contains("## USER STORY"));
    assert!(story
        .attempts
        .iter()
        .all(|a| a.outcome == AttemptOutcome::SkippedUnavailable));

    // the template result is persisted too
    let stats = service.get_stats().await;
    assert_eq!(stats.get("generated_stories"), Some(&1));
}

#[tokio::test]
async fn vietnamese_complex_prompt_lands_in_large_tier() {
    let generation = MockGenerationService::new().with_available(false);
    let service = service_with(generation, &["b1", "b2"]);
    service.initialize().await;

    let story = service
        .generate_story(GenerationRequest::new("phức tạp tích hợp hệ thống"))
        .await
        .unwrap();

    assert_eq!(story.origin, StoryOrigin::Template);
    assert!(
        story.text.contains("**Story Points:** 8"),
        "complex/integration keywords must land in the large tier"
    );
}

#[tokio::test]
async fn empty_prompt_is_rejected_at_the_boundary() {
    let generation = MockGenerationService::new().with_response("b1", "never used");
    let service = service_with(generation.clone(), &["b1"]);
    service.initialize().await;

    assert!(service
        .generate_story(GenerationRequest::new(""))
        .await
        .is_err());
    assert!(service
        .generate_story(GenerationRequest::new("   \n"))
        .await
        .is_err());

    // nothing reached the pipeline
    assert_eq!(generation.generate_call_count(), 0);
    assert_eq!(service.get_stats().await.get("generated_stories"), Some(&0));
}

#[tokio::test]
async fn fresh_context_is_stored_and_flagged() {
    let generation = MockGenerationService::new().with_response("b1", "with context");
    let service = service_with(generation, &["b1"]);
    service.initialize().await;

    let mut context = SourceContext::new();
    context.insert(
        "github".to_string(),
        vec![Record::new(
            "issue_acme_shop_12",
            "Issue #12: Implement OAuth2 authentication",
            json!({"type": "issue", "number": 12}),
        )],
    );

    let story = service
        .generate_story(GenerationRequest::new("harden the login flow").with_context(context))
        .await
        .unwrap();

    assert_eq!(story.origin, StoryOrigin::Backend("b1".to_string()));

    // write-through: the fresh record landed in its collection
    let stats = service.get_stats().await;
    assert_eq!(stats.get("github_data"), Some(&1));
    assert_eq!(stats.get("generated_stories"), Some(&1));

    let hits = service
        .search(
            "with context",
            SearchScope::One(Collection::GeneratedStories),
            5,
        )
        .await;
    assert_eq!(
        hits[0].metadata.get("has_context").and_then(|v| v.as_bool()),
        Some(true)
    );
}

#[tokio::test]
async fn unknown_context_category_enriches_but_is_not_stored() {
    let generation = MockGenerationService::new().with_available(false);
    let service = service_with(generation, &[]);
    service.initialize().await;

    let mut context = SourceContext::new();
    context.insert(
        "wiki".to_string(),
        vec![Record::new("wiki_1", "Design notes page", json!({}))],
    );

    let story = service
        .generate_story(GenerationRequest::new("document the flow").with_context(context))
        .await
        .unwrap();

    assert_eq!(story.origin, StoryOrigin::Template);
    let stats = service.get_stats().await;
    assert!(stats.values().filter(|&&n| n > 0).count() == 1, "only the generated story is stored: {:?}", stats);
}

#[tokio::test]
async fn regenerating_same_prompt_overwrites_stored_story() {
    let generation = MockGenerationService::new().with_response("b1", "draft one");
    let service = service_with(generation, &["b1"]);
    service.initialize().await;

    let request = GenerationRequest::new("add search filters");
    service.generate_story(request.clone()).await.unwrap();
    service.generate_story(request).await.unwrap();

    let stats = service.get_stats().await;
    assert_eq!(
        stats.get("generated_stories"),
        Some(&1),
        "same prompt must overwrite, not duplicate"
    );
}

#[tokio::test]
async fn generation_works_without_initialized_store() {
    let generation = MockGenerationService::new().with_response("b1", "storeless draft");
    let service = service_with(generation, &["b1"]);
    // no initialize(): retrieval is skipped and persistence degrades

    let story = service
        .generate_story(GenerationRequest::new("add search filters"))
        .await
        .unwrap();

    assert_eq!(story.text, "storeless draft");
    assert!(!service.is_initialized());
    assert!(service.get_stats().await.is_empty());
}

#[tokio::test]
async fn prior_stories_feed_back_into_the_enriched_prompt() {
    let generation = MockGenerationService::new().with_response("b1", "draft about login");
    let service = service_with(generation.clone(), &["b1"]);
    service.initialize().await;

    service
        .generate_story(GenerationRequest::new("login page improvements"))
        .await
        .unwrap();

    service
        .generate_story(GenerationRequest::new("login error messages"))
        .await
        .unwrap();

    // the second call's prompt carried history retrieved from the store
    let calls = generation.calls();
    let second_prompt = &calls
        .iter()
        .filter(|c| c.operation == "generate")
        .nth(1)
        .unwrap()
        .input;
    assert!(second_prompt.contains("PRIMARY REQUEST: login error messages"));
    assert!(second_prompt.contains("RELATED HISTORY:"));
    assert!(second_prompt.contains("[generated_stories]"));
    assert!(second_prompt.contains("TASK:"));
}

#[tokio::test]
async fn raw_prompt_passes_through_when_store_is_empty() {
    let generation = MockGenerationService::new().with_response("b1", "plain draft");
    let service = service_with(generation.clone(), &["b1"]);
    service.initialize().await;

    service
        .generate_story(GenerationRequest::new("a brand new request"))
        .await
        .unwrap();

    let calls = generation.calls();
    let prompt = &calls
        .iter()
        .find(|c| c.operation == "generate")
        .unwrap()
        .input;
    assert_eq!(
        prompt, "a brand new request",
        "no context sections when the store has nothing relevant"
    );
}

#[tokio::test]
async fn clear_collection_by_name_resets_only_that_collection() {
    let generation = MockGenerationService::new().with_response("b1", "draft");
    let service = service_with(generation, &["b1"]);
    service.initialize().await;

    service
        .add_context(
            Collection::GithubData,
            vec![Record::new("issue_a_b_1", "Issue #1", json!({}))],
        )
        .await;
    service
        .generate_story(GenerationRequest::new("add filters"))
        .await
        .unwrap();

    assert!(service.clear_collection("generated_stories").await);
    assert!(!service.clear_collection("does-not-exist").await);

    let stats = service.get_stats().await;
    assert_eq!(stats.get("generated_stories"), Some(&0));
    assert_eq!(stats.get("github_data"), Some(&1));
}

#[tokio::test]
async fn model_chain_defaults_are_ordered_smallest_first() {
    let generation = MockGenerationService::new();
    let service = StoryService::new(store(), Arc::new(generation), PipelineConfig::default());

    assert_eq!(
        service.model_chain(),
        &[
            "llama3.2:1b",
            "llama3.2:3b",
            "qwen2:1.5b",
            "gemma2:2b",
            "phi3:mini"
        ]
    );
}
