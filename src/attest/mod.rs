//! HMAC-SHA256 attestations over issued verification results.
//!
//! The signed payload binds recipient, skill, score, time, request id and
//! the evidence fingerprint, so the ledger (or anyone holding the key) can
//! check that a score came from this verifier unaltered.

use crate::config::AttestationConfig;
use crate::verify::VerificationResult;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const DOMAIN_SEPARATOR: &str = "skillproof-v1";
/// Publicly known key used when no secret is configured. Attestations made
/// with it prove nothing and carry `key_id = "demo"`.
const DEMO_SECRET: &str = "skillproof-demo-attestation-secret";
const DEMO_KEY_ID: &str = "demo";
const DEFAULT_KEY_ID: &str = "default";

/// Everything an attestation commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationClaim {
    pub recipient: Option<String>,
    pub skill: String,
    pub score: u32,
    pub timestamp: i64,
    pub request_id: String,
    pub evidence_hash: Option<String>,
}

impl AttestationClaim {
    /// Claim for `result` stamped with the current time and a fresh request id.
    pub fn for_result(result: &VerificationResult, skill: &str, recipient: Option<&str>) -> Self {
        Self {
            recipient: recipient.map(str::to_string),
            skill: skill.to_string(),
            score: result.ai_score,
            timestamp: Utc::now().timestamp(),
            request_id: Uuid::new_v4().to_string(),
            evidence_hash: result.evidence_hash.clone(),
        }
    }

    /// Pipe-joined canonical form that gets signed.
    pub fn payload(&self) -> String {
        [
            DOMAIN_SEPARATOR,
            self.recipient.as_deref().unwrap_or("anonymous"),
            &self.skill,
            &self.score.to_string(),
            &self.timestamp.to_string(),
            &self.request_id,
            self.evidence_hash.as_deref().unwrap_or("none"),
        ]
        .join("|")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub signature: String,
    pub payload: String,
    pub payload_hash: String,
    pub key_id: String,
    pub request_id: String,
    pub timestamp: i64,
    pub score: u32,
    pub signed_at: DateTime<Utc>,
}

pub struct Attestor {
    secret: Vec<u8>,
    key_id: String,
}

impl Attestor {
    pub fn new(config: &AttestationConfig) -> Self {
        match config.secret.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(secret) => Self {
                secret: secret.as_bytes().to_vec(),
                key_id: config
                    .key_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_KEY_ID.to_string()),
            },
            None => {
                warn!("No attestation secret configured; signing with the public demo key");
                Self {
                    secret: DEMO_SECRET.as_bytes().to_vec(),
                    key_id: DEMO_KEY_ID.to_string(),
                }
            }
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn is_demo(&self) -> bool {
        self.key_id == DEMO_KEY_ID
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| anyhow!("invalid HMAC key: {e}"))
    }

    pub fn sign(&self, claim: &AttestationClaim) -> Result<Attestation> {
        let payload = claim.payload();
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        debug!(
            key_id = %self.key_id,
            request_id = %claim.request_id,
            score = claim.score,
            "Signed attestation"
        );

        Ok(Attestation {
            payload_hash: hex::encode(Sha256::digest(payload.as_bytes())),
            signature,
            payload,
            key_id: self.key_id.clone(),
            request_id: claim.request_id.clone(),
            timestamp: claim.timestamp,
            score: claim.score,
            signed_at: Utc::now(),
        })
    }

    /// Sign an issued result. REJECT results are never attested.
    pub fn attest(
        &self,
        result: &VerificationResult,
        skill: &str,
        recipient: Option<&str>,
    ) -> Result<Option<Attestation>> {
        if !result.is_issued() {
            return Ok(None);
        }
        self.sign(&AttestationClaim::for_result(result, skill, recipient))
            .map(Some)
    }

    /// Constant-time check of a hex signature over `payload`.
    pub fn verify(&self, payload: &str, signature_hex: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(payload.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}
