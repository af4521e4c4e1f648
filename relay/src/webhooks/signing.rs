//! HMAC-SHA256 signing for provider webhooks.
//!
//! The provider signs every notification with the shared webhook secret:
//! - Signature is computed over the raw request body, byte for byte
//! - The signature is the lowercase hex encoding of the HMAC-SHA256 digest
//! - It arrives in the `X-Signature` header (name is configurable)
//!
//! There is no timestamp or message id in the signed content, so a captured request can be
//! replayed and will verify again.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Sign a webhook payload.
///
/// # Returns
///
/// The lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature.
///
/// # Arguments
///
/// * `payload` - The raw request body
/// * `signature` - The signature header value
/// * `secret` - The shared webhook secret
///
/// # Returns
///
/// `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &[u8]) -> bool {
    let expected = sign_payload(payload, secret);

    // Length mismatch returns early; lengths are public (always 64 for a valid signature)
    expected.as_bytes().ct_eq(signature.trim().as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cr3t";
    const BODY: &[u8] = br#"{"event":"order.status.changed","data":{"uuid":"abc","status":"received"}}"#;

    #[test]
    fn test_sign_is_lowercase_hex() {
        let signature = sign_payload(BODY, SECRET);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let signature = sign_payload(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(signature, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }

    #[test]
    fn test_sign_and_verify() {
        let signature = sign_payload(BODY, SECRET);

        // Verify should pass
        assert!(verify_signature(BODY, &signature, SECRET));

        // Wrong payload should fail
        assert!(!verify_signature(b"{}", &signature, SECRET));

        // Wrong secret should fail
        assert!(!verify_signature(BODY, &signature, b"other"));
    }

    #[test]
    fn test_any_bit_flip_in_body_is_rejected() {
        let signature = sign_payload(BODY, SECRET);

        for byte in 0..BODY.len() {
            for bit in 0..8 {
                let mut mutated = BODY.to_vec();
                mutated[byte] ^= 1 << bit;
                assert!(
                    !verify_signature(&mutated, &signature, SECRET),
                    "flipping bit {bit} of byte {byte} was accepted"
                );
            }
        }
    }

    #[test]
    fn test_any_bit_flip_in_signature_is_rejected() {
        let signature = sign_payload(BODY, SECRET);

        for byte in 0..signature.len() {
            for bit in 0..8 {
                let mut mutated = signature.clone().into_bytes();
                mutated[byte] ^= 1 << bit;
                // Bit flips can produce invalid UTF-8; those can never arrive as a header string
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                assert!(!verify_signature(BODY, &mutated, SECRET));
            }
        }
    }

    #[test]
    fn test_verify_rejects_other_encodings() {
        let signature = sign_payload(BODY, SECRET);

        assert!(!verify_signature(BODY, "", SECRET));
        assert!(!verify_signature(BODY, &signature[..63], SECRET));
        assert!(!verify_signature(BODY, &signature.to_uppercase(), SECRET));
        assert!(!verify_signature(BODY, &format!("sha256={signature}"), SECRET));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let signature = sign_payload(BODY, SECRET);
        assert!(verify_signature(BODY, &format!(" {signature} "), SECRET));
    }
}
