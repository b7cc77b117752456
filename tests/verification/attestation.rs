use crate::support::{REPO_URL, fallback_config, mount_small_repo};
use skillproof::config::AttestationConfig;
use skillproof::{AttestationClaim, Attestor, Verifier};
use wiremock::MockServer;

fn attestor(secret: &str) -> Attestor {
    Attestor::new(&AttestationConfig {
        secret: Some(secret.into()),
        key_id: Some("ledger-2026".into()),
    })
}

#[tokio::test]
async fn issued_result_is_attested_with_evidence_hash() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;
    let verifier = Verifier::new(&fallback_config(&server)).unwrap();
    let result = verifier.verify(REPO_URL, "Rust").await.unwrap();
    let attestor = attestor("ledger-secret");

    let attestation = attestor.attest(&result, "Rust", Some("WALLET42")).unwrap();

    match (result.is_issued(), attestation) {
        (true, Some(att)) => {
            let hash = result.evidence_hash.as_deref().unwrap();
            assert!(att.payload.starts_with("skillproof-v1|WALLET42|Rust|"));
            assert!(att.payload.ends_with(hash));
            assert_eq!(att.score, result.ai_score);
            assert_eq!(att.key_id, "ledger-2026");
            assert!(attestor.verify(&att.payload, &att.signature));
        }
        (false, None) => {}
        (issued, att) => panic!("issued={issued} but attestation={att:?}"),
    }
}

#[test]
fn signature_binds_every_field() {
    let attestor = attestor("ledger-secret");
    let claim = AttestationClaim {
        recipient: None,
        skill: "Go".into(),
        score: 70,
        timestamp: 1_760_000_000,
        request_id: "7f1c".into(),
        evidence_hash: Some("sha256:00ff".into()),
    };
    let att = attestor.sign(&claim).unwrap();
    assert_eq!(
        att.payload,
        "skillproof-v1|anonymous|Go|70|1760000000|7f1c|sha256:00ff"
    );

    for (from, to) in [
        ("|Go|", "|Rust|"),
        ("|70|", "|71|"),
        ("|7f1c|", "|7f1d|"),
        ("anonymous", "WALLET42"),
        ("sha256:00ff", "sha256:00fe"),
    ] {
        let tampered = att.payload.replace(from, to);
        assert!(!attestor.verify(&tampered, &att.signature), "{from} -> {to}");
    }
    assert!(!Attestor::new(&AttestationConfig::default()).verify(&att.payload, &att.signature));
}

#[test]
fn fresh_claims_get_distinct_request_ids() {
    let rejected = skillproof::VerificationResult::rejection(
        &skillproof::VerifyError::EmptyRepository,
        skillproof::AssessmentMode::Fallback,
    );
    let a = AttestationClaim::for_result(&rejected, "Rust", None);
    let b = AttestationClaim::for_result(&rejected, "Rust", None);
    assert_ne!(a.request_id, b.request_id);
    assert!(a.payload().ends_with("|none"));
}
