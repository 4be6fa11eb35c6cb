//! Notarization Integration Tests
//!
//! Calculate write ordering, signing fallbacks, durable archive copies,
//! certificates and process scoring.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{durable_evidence, services_from, services_with, FailingSigner, ScriptedJudge};
use proofa::config::{JudgeSettings, ResolvedConfig};
use proofa::core::{verify_certificate, verify_evidence, CalculateRequest, Services};
use proofa::crypto::{DilithiumSigner, Signer};
use proofa::domain::{SIGNATURE_ARCHIVED, SIGNATURE_PENDING};
use proofa::store::{DurableStore, JsonlStore};
use proofa::ProofaError;
use tempfile::TempDir;
use uuid::Uuid;

fn request(user_id: Uuid, prompt: &str, seed_id: Option<Uuid>) -> CalculateRequest {
    CalculateRequest {
        user_id,
        prompt: prompt.to_string(),
        seed_id,
    }
}

#[tokio::test]
async fn test_registered_user_signature_verifies() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services
        .accounts
        .register("artist@example.com", "ext-1")
        .await
        .unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "a harbour where ships dock in dreams", None))
        .await
        .unwrap();

    assert!(result.is_signed());
    assert!(!result.ephemeral_key);
    assert_eq!(result.score, 0.82);
    assert_eq!(result.reasoning, "scripted verdict");

    let digest = hex::decode(&result.evidence_hash).unwrap();
    let signature = hex::decode(&result.signature).unwrap();
    assert!(DilithiumSigner
        .verify(&user.keys.public_key, &digest, &signature)
        .unwrap());
}

#[tokio::test]
async fn test_user_without_keys_still_gets_a_result() {
    let (services, store) = services_with(Arc::new(ScriptedJudge::default()));
    let unknown = Uuid::new_v4();

    let result = services
        .notary
        .calculate(request(unknown, "a lantern that remembers every voice", None))
        .await
        .unwrap();

    if result.signature == SIGNATURE_PENDING {
        assert!(result.public_key.is_none());
    } else {
        assert!(result.ephemeral_key);
        let public_key = hex::decode(result.public_key.as_ref().unwrap()).unwrap();
        let digest = hex::decode(&result.evidence_hash).unwrap();
        let signature = hex::decode(&result.signature).unwrap();
        assert!(DilithiumSigner.verify(&public_key, &digest, &signature).unwrap());
    }

    // The synthesized key is not stored as the user's identity
    assert!(store.get_user(unknown).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_written_before_return() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "paper cranes migrating south", None))
        .await
        .unwrap();

    let cached = services.notary.evidence(result.evidence_id).await.unwrap().unwrap();
    assert_eq!(cached.signature, result.signature);
    assert_eq!(cached.evidence_hash, result.evidence_hash);
    assert_eq!(services.notary.cached_evidence().len(), 1);

    assert!(verify_evidence(&DilithiumSigner, &cached, &user.keys.public_key).unwrap());
}

#[tokio::test]
async fn test_durable_copy_matches_cache_except_signature() {
    let (services, store) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "a violin carved from driftwood", None))
        .await
        .unwrap();
    services.flush().await;

    let cached = services.notary.evidence(result.evidence_id).await.unwrap().unwrap();
    let durable = durable_evidence(&store, result.evidence_id).await.unwrap();

    assert_eq!(durable.evidence_hash, cached.evidence_hash);
    assert_eq!(durable.human_score, cached.human_score);
    assert_eq!(durable.reasoning, cached.reasoning);
    assert_eq!(durable.signature, SIGNATURE_ARCHIVED);
    assert_ne!(cached.signature, SIGNATURE_ARCHIVED);
}

#[tokio::test]
async fn test_archived_line_on_disk_matches_cache() {
    let temp = TempDir::new().unwrap();
    let config = ResolvedConfig {
        home: temp.path().to_path_buf(),
        config_file: None,
        judge: JudgeSettings::default(),
    };
    let services = Services::from_config(&config).await.unwrap();
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "a kite that refuses to come down", None))
        .await
        .unwrap();
    services.flush().await;

    let cached = services.notary.evidence(result.evidence_id).await.unwrap().unwrap();
    assert!(verify_evidence(&DilithiumSigner, &cached, &user.keys.public_key).unwrap());

    // Fresh handle so the record comes back from the JSONL file itself
    let reopened = JsonlStore::open(config.store_dir()).await.unwrap();
    let archived = reopened.all_evidence().await.unwrap();

    assert_eq!(archived.len(), 1);
    let durable = &archived[0];
    assert_eq!(durable.id, cached.id);
    assert_eq!(durable.evidence_hash, cached.evidence_hash);
    assert_eq!(durable.human_score, cached.human_score);
    assert_eq!(durable.reasoning, cached.reasoning);
    assert_eq!(durable.prompt, cached.prompt);
    assert_eq!(durable.signature, SIGNATURE_ARCHIVED);
    assert_eq!(
        reopened.get_evidence(result.evidence_id).await.unwrap().as_ref(),
        Some(durable)
    );
}

#[tokio::test]
async fn test_oracle_failure_leaves_no_evidence() {
    let judge = Arc::new(ScriptedJudge {
        fail_verify: true,
        ..ScriptedJudge::default()
    });
    let (services, store) = services_with(judge);
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let err = services
        .notary
        .calculate(request(user.id, "a clock that runs on applause", None))
        .await
        .unwrap_err();
    services.flush().await;

    assert!(err.is_oracle());
    assert!(services.notary.cached_evidence().is_empty());
    assert!(store.all_evidence().is_empty());
}

#[tokio::test]
async fn test_signing_failure_marks_pending() {
    let (services, store) = services_from(
        Arc::new(ScriptedJudge::default()),
        |b| b.signer = Arc::new(FailingSigner),
        Duration::from_secs(5),
    );
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "a museum of forgotten smells", None))
        .await
        .unwrap();
    services.flush().await;

    assert_eq!(result.signature, SIGNATURE_PENDING);
    assert!(result.public_key.is_none());
    assert_eq!(result.score, 0.82);
    assert_eq!(store.all_evidence().len(), 1);
}

#[tokio::test]
async fn test_seed_context_passed_to_judge() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, _) = services_with(judge.clone());
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let seed = services
        .registry
        .upload_seed(user.id, "An orchard where every tree grows a season", Vec::new())
        .await
        .unwrap();

    services
        .notary
        .calculate(request(user.id, "winter fruit tastes of woodsmoke", Some(seed.id)))
        .await
        .unwrap();
    services
        .notary
        .calculate(request(user.id, "no seed this time", None))
        .await
        .unwrap();

    let contexts = judge.contexts.lock().unwrap().clone();
    assert_eq!(
        contexts,
        vec![
            "An orchard where every tree grows a season".to_string(),
            String::new()
        ]
    );
}

#[tokio::test]
async fn test_evidence_hash_is_deterministic_for_same_interaction() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();
    let prompt = "the tide returns only what it borrowed";

    let a = services
        .notary
        .calculate(request(user.id, prompt, None))
        .await
        .unwrap();
    let b = services
        .notary
        .calculate(request(user.id, prompt, None))
        .await
        .unwrap();

    assert_eq!(a.evidence_hash, b.evidence_hash);
    assert_ne!(a.evidence_id, b.evidence_id);
}

#[tokio::test]
async fn test_tampered_evidence_fails_verification() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let result = services
        .notary
        .calculate(request(user.id, "salt maps of the inland sea", None))
        .await
        .unwrap();
    let mut record = services.notary.evidence(result.evidence_id).await.unwrap().unwrap();

    record.human_score = 0.99;
    assert!(!verify_evidence(&DilithiumSigner, &record, &user.keys.public_key).unwrap());
}

#[tokio::test]
async fn test_certify_and_verify_certificate() {
    let (services, store) = services_with(Arc::new(ScriptedJudge::with_ai(12.0)));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let seed = services
        .seeds
        .verify_seed(user.id, "A cartographer who maps the silence between songs")
        .await
        .unwrap();
    let cert = services
        .licensing
        .certify(user.id, seed.project_id)
        .await
        .unwrap();

    assert_eq!(cert.project_id, seed.project_id);
    assert!(cert.audit_data.contains("EU AI Act Article 52 (Transparency)"));
    assert!(verify_certificate(&DilithiumSigner, &cert, &user.keys.public_key).unwrap());
    assert_eq!(store.get_certificate(cert.id).await.unwrap(), Some(cert.clone()));

    let mut tampered = cert.clone();
    tampered.audit_data.push(' ');
    assert!(!verify_certificate(&DilithiumSigner, &tampered, &user.keys.public_key).unwrap());
}

#[tokio::test]
async fn test_certify_unknown_project() {
    let (services, _) = services_with(Arc::new(ScriptedJudge::default()));
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();

    let err = services
        .licensing
        .certify(user.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ProofaError::NotFound(_)));
}

#[tokio::test]
async fn test_update_score_uses_seed_history() {
    let judge = Arc::new(ScriptedJudge::default());
    let (services, _) = services_with(judge.clone());
    let user = services.accounts.register("a@b.c", "ext").await.unwrap();
    let seed = services
        .registry
        .upload_seed(user.id, "A bell that rings once per century", Vec::new())
        .await
        .unwrap();

    for prompt in ["the bell cracks", "a child hears it twice"] {
        services
            .notary
            .calculate(request(user.id, prompt, Some(seed.id)))
            .await
            .unwrap();
        services.flush().await;
    }

    let update = services
        .process
        .update_score(user.id, seed.id, "the village learns to wait")
        .await
        .unwrap();

    assert_eq!(update.human_score, 0.82);
    assert_eq!(update.creative_delta, 0.5);
    let histories = judge.histories.lock().unwrap().clone();
    assert_eq!(
        histories,
        vec![vec![
            "the bell cracks".to_string(),
            "a child hears it twice".to_string()
        ]]
    );
}
