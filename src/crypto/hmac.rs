use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Shared HMAC-SHA256 routine for Neynar webhook payloads. The webhook relay
/// verifies inbound deliveries with it and `/api/sign-cast` signs outbound
/// test payloads with it, so both sides agree on one scheme.
pub struct WebhookSigner {
    secret: Vec<u8>,
}

impl WebhookSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Hex signature over the exact payload bytes.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a hex signature against the payload bytes.
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> Result<()> {
        let signature = hex::decode(signature_hex.trim())
            .map_err(|_| AppError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload);
        mac.verify_slice(&signature)
            .map_err(|_| AppError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let signer = WebhookSigner::new("shared-secret");
        let body = br#"{"data":{"hash":"0xcast"}}"#;
        let signature = signer.sign(body);
        assert!(signer.verify(body, &signature).is_ok());
    }

    #[test]
    fn any_body_mutation_invalidates_signature() {
        let signer = WebhookSigner::new("shared-secret");
        let body = br#"{"data":{"hash":"0xcast"}}"#;
        let signature = signer.sign(body);

        let mutated = br#"{"data":{"hash":"0xCAST"}}"#;
        assert!(matches!(
            signer.verify(mutated, &signature),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let body = b"payload";
        let signature = WebhookSigner::new("secret-a").sign(body);
        assert!(WebhookSigner::new("secret-b").verify(body, &signature).is_err());
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let signer = WebhookSigner::new("shared-secret");
        assert!(matches!(
            signer.verify(b"payload", "not hex at all"),
            Err(AppError::InvalidSignature)
        ));
    }
}
