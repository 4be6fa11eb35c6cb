//! Seed Classification Integration Tests
//!
//! Triage, priority-ordered status decisions, birth hashes and soft/hard
//! failure handling in seed verification.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{services_from, services_with, FailingIndex, FixedPlagiarism, ScriptedJudge};
use proofa::adapters::HeuristicJudge;
use proofa::domain::SeedStatus;
use uuid::Uuid;

const CREATIVE_SEED: &str = "Hello, this is a very long and detailed creative seed I am writing.";

#[tokio::test]
async fn test_short_text_triaged_without_oracle_calls() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, store) = services_with(judge.clone());

    for text in ["Short text", "tiny", "a lonely comet"] {
        let result = services.seeds.verify_seed(Uuid::new_v4(), text).await.unwrap();
        assert_eq!(result.status, SeedStatus::Yellow);
        assert_eq!(result.ai_probability, 100.0);
        assert!(result.birth_hash.is_none());
    }

    assert_eq!(judge.embeds(), 0);
    assert_eq!(judge.detects(), 0);
    // Triaged seeds still get a project
    assert_eq!(store.project_count(), 3);
}

#[tokio::test]
async fn test_command_prefixes_triaged() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, _) = services_with(judge.clone());

    for text in [
        "Write a story about a dragon who hoards clocks",
        "how to paint a convincing thunderstorm at dusk",
        "Please look at the screenshot and improve the palette",
    ] {
        let result = services.seeds.verify_seed(Uuid::new_v4(), text).await.unwrap();
        assert_eq!(result.status, SeedStatus::Yellow, "text: {}", text);
        assert_eq!(result.ai_probability, 100.0);
    }
    assert_eq!(judge.embeds() + judge.detects(), 0);
}

#[tokio::test]
async fn test_long_creative_seed_proceeds_past_triage() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, _) = services_with(judge.clone());

    let result = services
        .seeds
        .verify_seed(Uuid::new_v4(), CREATIVE_SEED)
        .await
        .unwrap();

    assert_eq!(judge.embeds(), 1);
    assert_eq!(judge.detects(), 1);
    assert_eq!(result.status, SeedStatus::Green);
    assert_eq!(result.reasoning, "Unique human-authored seed detected.");
    assert_eq!(result.birth_hash.as_ref().map(|h| h.len()), Some(64));
}

#[tokio::test]
async fn test_lorem_ipsum_is_plagiarized() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));

    let result = services
        .seeds
        .verify_seed(
            Uuid::new_v4(),
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit",
        )
        .await
        .unwrap();

    assert_eq!(result.status, SeedStatus::Plagiarized);
    assert_eq!(result.plagiarism_score, 95.0);
    assert!(result.birth_hash.is_none());
}

#[tokio::test]
async fn test_ai_seed_outranks_plagiarism_and_internal_match() {
    let (services, _) = services_from(
        Arc::new(ScriptedJudge::with_ai(95.0)),
        |b| b.plagiarism = Arc::new(FixedPlagiarism(50.0)),
        Duration::from_secs(5),
    );
    let owner = Uuid::new_v4();

    services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();
    let second = services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();

    // All three signals hold; only the first rule is reported
    assert!(second.internal_match);
    assert_eq!(second.plagiarism_score, 50.0);
    assert_eq!(second.status, SeedStatus::AiSeed);
    assert_eq!(
        second.reasoning,
        "High AI probability detected. Higher proof threshold required."
    );
    assert!(second.birth_hash.is_none());
}

#[tokio::test]
async fn test_plagiarism_outranks_internal_match() {
    let (services, _) = services_from(
        Arc::new(ScriptedJudge::with_ai(80.0)),
        |b| b.plagiarism = Arc::new(FixedPlagiarism(30.0)),
        Duration::from_secs(5),
    );
    let owner = Uuid::new_v4();

    services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();
    let second = services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();

    assert!(second.internal_match);
    assert_eq!(second.status, SeedStatus::Plagiarized);
    assert_eq!(second.reasoning, "External plagiarism match detected.");
}

#[tokio::test]
async fn test_duplicate_seed_is_internal_match() {
    let (services, _) = services_with(Arc::new(HeuristicJudge::new()));
    let owner = Uuid::new_v4();
    let text = "A city of glass bridges suspended over a silent ocean at dawn";

    let first = services.seeds.verify_seed(owner, text).await.unwrap();
    assert_eq!(first.status, SeedStatus::Green);
    assert!(!first.internal_match);
    assert!(first.birth_hash.is_some());

    let second = services.seeds.verify_seed(owner, text).await.unwrap();
    assert!(second.internal_match);
    assert_eq!(second.status, SeedStatus::Yellow);
    assert_eq!(
        second.reasoning,
        "Internal similarity match. Protecting existing authorship."
    );
    assert!(second.birth_hash.is_none());

    // Similarity is scoped to the owner
    let other = services.seeds.verify_seed(Uuid::new_v4(), text).await.unwrap();
    assert!(!other.internal_match);
    assert!(other.birth_hash.is_some());
}

#[tokio::test]
async fn test_moderate_ai_is_yellow_with_birth_hash() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::with_ai(75.0)));

    let result = services
        .seeds
        .verify_seed(Uuid::new_v4(), CREATIVE_SEED)
        .await
        .unwrap();

    assert_eq!(result.status, SeedStatus::Yellow);
    assert_eq!(result.reasoning, "Moderate AI patterns detected.");
    assert!(result.birth_hash.is_some());
}

#[tokio::test]
async fn test_birth_hashes_are_unique_per_call() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let owner = Uuid::new_v4();

    let a = services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();
    // Different owner so the second call is not an internal match
    let b = services
        .seeds
        .verify_seed(Uuid::new_v4(), CREATIVE_SEED)
        .await
        .unwrap();

    assert_ne!(a.birth_hash, b.birth_hash);
}

#[tokio::test]
async fn test_index_failure_is_not_fatal() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, store) = services_from(
        judge.clone(),
        |b| b.index = Arc::new(FailingIndex),
        Duration::from_secs(5),
    );

    let result = services
        .seeds
        .verify_seed(Uuid::new_v4(), CREATIVE_SEED)
        .await
        .unwrap();

    assert!(!result.internal_match);
    assert_eq!(result.status, SeedStatus::Green);
    assert!(result.birth_hash.is_some());
    assert_eq!(store.project_count(), 1);
}

#[tokio::test]
async fn test_ai_detection_failure_is_fatal() {
    let judge = Arc::new(ScriptedJudge {
        fail_detect: true,
        ..ScriptedJudge::default()
    });
    let (services, store) = services_with(judge.clone());

    let err = services
        .seeds
        .verify_seed(Uuid::new_v4(), CREATIVE_SEED)
        .await
        .unwrap_err();

    assert!(err.is_oracle());
    assert_eq!(store.project_count(), 0);
}

#[tokio::test]
async fn test_project_is_readable_after_classification() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let owner = Uuid::new_v4();

    let result = services.seeds.verify_seed(owner, CREATIVE_SEED).await.unwrap();
    let project = services.seeds.project(result.project_id).await.unwrap().unwrap();

    assert_eq!(project.owner_id, owner);
    assert_eq!(project.status, result.status);
    assert_eq!(project.birth_hash, result.birth_hash);
    assert!(project.embedding.is_some());
}
