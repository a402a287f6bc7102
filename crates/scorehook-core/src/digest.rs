//! Score digests and tamper classification.
//!
//! The client hashes its scores the same way before submitting, so the
//! preimage format is a wire contract: each score with one decimal place,
//! comma-joined, SHA-512 over the ASCII bytes, base64 (standard, padded) on
//! the wire.
//!
//! Comparison is plain equality. This detects accidental or casual tampering
//! in transit; it is not a keyed MAC and holds no secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha512};

/// Outcome of comparing the submitted digest with the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticity {
    Authentic,
    Tampered,
    MissingAuth,
}

impl Authenticity {
    /// Label shown in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingAuth => "❓ Missing score authentication",
            Self::Authentic => "✅ Authentic score",
            Self::Tampered => "❌ Tampered score",
        }
    }
}

/// Canonical preimage: `"%.1f"` of each score joined by `,`.
pub fn digest_preimage(scores: &[f64]) -> String {
    scores
        .iter()
        .map(|s| format!("{s:.1}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// SHA-512 of the canonical preimage.
pub fn digest_scores(scores: &[f64]) -> Vec<u8> {
    Sha512::digest(digest_preimage(scores).as_bytes()).to_vec()
}

/// Base64 form of [`digest_scores`], as a client would submit it.
pub fn encode_digest(scores: &[f64]) -> String {
    STANDARD.encode(digest_scores(scores))
}

/// Decode a submitted digest. Surrounding whitespace is ignored; anything
/// that is not valid standard base64 yields `None`.
pub fn decode_digest(submitted: &str) -> Option<Vec<u8>> {
    STANDARD.decode(submitted.trim()).ok()
}

/// Classify a submission given its (already decoded) digest.
pub fn check_digest(submitted: Option<&[u8]>, scores: &[f64]) -> Authenticity {
    match submitted {
        None => Authenticity::MissingAuth,
        Some(bytes) if bytes == digest_scores(scores).as_slice() => Authenticity::Authentic,
        Some(_) => Authenticity::Tampered,
    }
}
