// ABOUTME: PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
// ABOUTME: Generates 32-byte code verifiers, CSRF state tokens, and SHA256 challenges

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::oauth::types::PkceChallenge;

/// Number of random bytes behind both the code verifier and the state token
const RANDOM_BYTES: usize = 32;

/// Generate a PKCE challenge for OAuth flow
///
/// This generates a random code verifier and computes the SHA256 challenge
/// according to RFC 7636 (PKCE) specification.
pub fn generate_pkce_challenge() -> PkceChallenge {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);

    PkceChallenge {
        code_verifier,
        code_challenge,
        code_challenge_method: "S256".to_string(),
    }
}

/// Generate a random code verifier: 32 random bytes, base64url without padding (43 chars)
pub fn generate_code_verifier() -> String {
    random_token()
}

/// Generate an independent random CSRF state token
pub fn generate_state() -> String {
    random_token()
}

/// Generate SHA256 code challenge from verifier
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let hash = hasher.finalize();

    URL_SAFE_NO_PAD.encode(hash)
}

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
