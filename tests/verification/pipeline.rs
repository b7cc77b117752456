use crate::support::{
    OWNER, REPO, REPO_URL, TEST_KEY, chat_completion, fallback_config, live_config,
    mount_commits, mount_established_repo, mount_metadata_created, mount_small_repo, mount_tree,
    paths_requested,
};
use chrono::{Duration, Utc};
use serde_json::json;
use skillproof::assess::DeterministicFallbackAnalyzer;
use skillproof::{AssessmentMode, Recommendation, ScoreAggregator, SkillLevel, Verifier};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_JSON: &str = r#"{
  "code_quality": 88,
  "complexity": 72,
  "best_practices": 80,
  "originality": 65,
  "overall_score": 97,
  "evidence_summary": "src/main.rs is a minimal but idiomatic entry point.",
  "strengths": ["Idiomatic formatting", "Small focused files"],
  "weaknesses": ["No tests"]
}"#;

async fn mount_model(server: &MockServer, template: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ── Fallback mode ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fallback_mode_is_deterministic_and_skips_guard() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();
    assert_eq!(verifier.mode(), AssessmentMode::Fallback);

    let first = verifier.verify(REPO_URL, "Rust").await.unwrap();
    let second = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.mode, AssessmentMode::Fallback);
    assert!(first.evidence_summary.starts_with("[Demo Mode] Analyzed 2 files"));
    assert!(first.evidence_hash.as_deref().unwrap().starts_with("sha256:"));

    let expected_raw = DeterministicFallbackAnalyzer::scores(REPO_URL);
    let expected = ScoreAggregator::default().aggregate(&expected_raw).unwrap();
    assert_eq!(first.ai_score, expected.ai_score);
    assert_eq!(first.skill_level, expected.skill_level);
    assert_eq!(first.analysis.code_quality, expected_raw.code_quality);
    assert_eq!(first.analysis.strengths, expected_raw.strengths);

    let requested = paths_requested(&server.received_requests().await.unwrap());
    assert!(!requested.contains(&format!("/repos/{OWNER}/{REPO}")));
    assert!(!requested.iter().any(|p| p.ends_with("/commits")));
}

#[tokio::test]
async fn fallback_score_matches_weighted_formula() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();

    let result = verifier.verify(REPO_URL, "Python").await.unwrap();

    let a = &result.analysis;
    // Percent weights in integer arithmetic, rounding halves up.
    let hundredths =
        30 * a.code_quality + 25 * a.complexity + 25 * a.best_practices + 20 * a.originality;
    assert_eq!(result.ai_score, (hundredths + 50) / 100);
    assert_eq!(result.verified, result.ai_score >= 45);
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn tree_failure_on_both_branches_yields_fetch_rejection() {
    let server = MockServer::start().await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();

    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert!(!result.verified);
    assert_eq!(result.ai_score, 0);
    assert_eq!(result.skill_level, SkillLevel::Fail);
    assert_eq!(result.recommendation, Recommendation::Reject);
    assert_eq!(
        result.evidence_summary,
        "Could not fetch repository: could not fetch repository tree (HTTP 404)"
    );
    assert!(result.evidence_hash.is_none());
}

#[tokio::test]
async fn repository_without_source_files_is_distinct_rejection() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        "main",
        &[("README.md", "blob"), ("docs", "tree"), ("dist/app.js", "blob")],
    )
    .await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();

    let result = verifier.verify(REPO_URL, "JavaScript").await.unwrap();

    assert_eq!(result.recommendation, Recommendation::Reject);
    assert_eq!(
        result.evidence_summary,
        "Repository contains no analyzable source files"
    );
    assert_eq!(
        result.analysis.error.as_deref(),
        Some("no source files found in repository")
    );
}

#[tokio::test]
async fn invalid_url_is_rejected_without_network() {
    let server = MockServer::start().await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();

    let result = verifier.verify("not a url", "Rust").await.unwrap();

    assert_eq!(result.recommendation, Recommendation::Reject);
    assert!(
        result
            .evidence_summary
            .starts_with("Could not fetch repository: invalid repository URL")
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Live mode ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn live_mode_scores_fenced_model_reply() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_established_repo(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {TEST_KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.3,
            "max_tokens": 800,
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion(&format!("```json\n{MODEL_JSON}\n```"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    assert_eq!(verifier.mode(), AssessmentMode::Live);
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    // 0.30*88 + 0.25*72 + 0.25*80 + 0.20*65 = 77.4; the model's 97 is ignored.
    assert_eq!(result.ai_score, 77);
    assert_eq!(result.skill_level, SkillLevel::Advanced);
    assert!(result.verified);
    assert_eq!(result.recommendation, Recommendation::IssueCertificate);
    assert_eq!(result.mode, AssessmentMode::Live);
    assert_eq!(
        result.evidence_summary,
        "src/main.rs is a minimal but idiomatic entry point."
    );
    assert_eq!(result.analysis.weaknesses, vec!["No tests"]);
    assert!(result.analysis.error.is_none());
    server.verify().await;
}

#[tokio::test]
async fn live_mode_prompt_carries_every_sampled_file() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_established_repo(&server).await;
    mount_model(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_completion(MODEL_JSON)),
        1,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    verifier.verify(REPO_URL, "Rust").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let model_call = requests
        .iter()
        .find(|r| r.url.path() == "/v1/chat/completions")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&model_call.body).unwrap();
    assert_eq!(
        body["messages"][0]["content"],
        "You are a code quality analyzer. Respond only with valid JSON."
    );
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("--- FILE: src/main.rs ---"));
    assert!(prompt.contains("--- FILE: scripts/build.py ---"));
    assert!(prompt.contains("claims proficiency in: Rust"));
}

#[tokio::test]
async fn new_repository_is_rejected_before_model_call() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_metadata_created(&server, Utc::now() - Duration::minutes(5)).await;
    mount_commits(&server, 5).await;
    mount_model(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_completion(MODEL_JSON)),
        0,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(result.recommendation, Recommendation::Reject);
    assert!(
        result
            .evidence_summary
            .starts_with("Authenticity check failed: repository too new")
    );
    assert!(result.evidence_hash.is_some());
    server.verify().await;
}

#[tokio::test]
async fn thin_commit_history_is_rejected() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_metadata_created(&server, Utc::now() - Duration::days(90)).await;
    mount_commits(&server, 2).await;
    mount_model(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_completion(MODEL_JSON)),
        0,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(
        result.analysis.error.as_deref(),
        Some("insufficient commit history: found 2 commits, need at least 3")
    );
    server.verify().await;
}

#[tokio::test]
async fn guard_outage_fails_open_and_model_still_runs() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_model(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_completion(MODEL_JSON)),
        1,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(result.recommendation, Recommendation::IssueCertificate);
    server.verify().await;
}

#[tokio::test]
async fn unparseable_model_reply_is_rejected() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_established_repo(&server).await;
    mount_model(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(chat_completion("This code looks great, I'd give it an 85.")),
        1,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(result.ai_score, 0);
    assert_eq!(result.evidence_summary, "AI analysis encountered an error");
    assert!(
        result
            .analysis
            .error
            .as_deref()
            .unwrap()
            .starts_with("failed to parse AI response")
    );
}

#[tokio::test]
async fn backend_error_is_rejected_without_leaking_key() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    mount_established_repo(&server).await;
    mount_model(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": format!("Incorrect API key provided: {TEST_KEY}") }
        })),
        1,
    )
    .await;

    let verifier = Verifier::new(&live_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(result.recommendation, Recommendation::Reject);
    assert!(result.evidence_summary.starts_with("AI analysis error:"));
    let serialized = serde_json::to_string(&result).unwrap();
    assert!(!serialized.contains("0123456789abcdef"));
}

#[tokio::test]
async fn placeholder_key_selects_fallback() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    let mut config = live_config(&server);
    config.model.api_key = Some("your-openai-api-key".into());

    let verifier = Verifier::new(&config).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();

    assert_eq!(result.mode, AssessmentMode::Fallback);
    let requested = paths_requested(&server.received_requests().await.unwrap());
    assert!(!requested.iter().any(|p| p.starts_with("/v1/")));
}
