//! Session Signer Module
//!
//! HMAC-SHA256 tag over the canonical session fields, keyed with a secret
//! shared by every node.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use super::SessionPayload;
use crate::error::{Result, ServiceError};

type HmacSha256 = Hmac<Sha256>;

// == Session Signer ==
/// Seals and checks session payloads.
#[derive(Clone)]
pub struct SessionSigner {
    /// MAC already keyed with the secret; cloned for every tag.
    keyed: HmacSha256,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Fails with `InvalidConfiguration` on an empty or unusable secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ServiceError::InvalidConfiguration(
                "session secret must not be empty".to_string(),
            ));
        }
        let keyed = HmacSha256::new_from_slice(&secret).map_err(|err| {
            ServiceError::InvalidConfiguration(format!("unusable session secret: {err}"))
        })?;
        Ok(Self { keyed })
    }

    fn mac(&self, payload: &SessionPayload) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(&payload.canonical_bytes());
        mac
    }

    // == Sign ==
    /// Computes the tag over `user_id` and `items` and attaches it, replacing
    /// any previous tag.
    pub fn sign(&self, mut payload: SessionPayload) -> SessionPayload {
        let tag = self.mac(&payload).finalize().into_bytes();
        payload.auth_tag = Some(hex::encode(tag));
        payload
    }

    // == Verify ==
    /// True iff the attached tag matches a fresh computation.
    ///
    /// The comparison is constant-time. A missing or non-hex tag is false.
    pub fn verify(&self, payload: &SessionPayload) -> bool {
        let Some(tag) = payload.auth_tag.as_deref() else {
            return false;
        };
        let Ok(tag) = hex::decode(tag) else {
            debug!("Session tag is not valid hex");
            return false;
        };
        self.mac(payload).verify_slice(&tag).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::OrderItem;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret").unwrap()
    }

    fn payload() -> SessionPayload {
        SessionPayload {
            user_id: None,
            items: vec![OrderItem::new(7, 1, 500)],
            auth_tag: None,
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SessionSigner::new(Vec::<u8>::new()),
            Err(ServiceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sign_then_verify() {
        let signed = signer().sign(payload());
        assert!(signed.auth_tag.is_some());
        assert!(signer().verify(&signed));
    }

    #[test]
    fn test_quantity_flip_detected_then_resigned() {
        let signer = signer();
        let mut signed = signer.sign(payload());

        signed.items[0].quantity = 2;
        assert!(!signer.verify(&signed));

        let resigned = signer.sign(signed);
        assert!(signer.verify(&resigned));
    }

    #[test]
    fn test_user_id_change_detected() {
        let signer = signer();
        let mut signed = signer.sign(payload());
        signed.user_id = Some(42);
        assert!(!signer.verify(&signed));
    }

    #[test]
    fn test_missing_or_garbage_tag() {
        let signer = signer();
        assert!(!signer.verify(&payload()));

        let mut garbage = payload();
        garbage.auth_tag = Some("not-hex".to_string());
        assert!(!signer.verify(&garbage));
    }

    #[test]
    fn test_different_secret_rejects() {
        let signed = signer().sign(payload());
        let other = SessionSigner::new("other-secret").unwrap();
        assert!(!other.verify(&signed));
    }

    #[test]
    fn test_sign_overwrites_existing_tag() {
        let mut stale = payload();
        stale.auth_tag = Some("00".repeat(32));

        let signed = signer().sign(stale);

        assert_ne!(signed.auth_tag.as_deref(), Some("00".repeat(32).as_str()));
        assert!(signer().verify(&signed));
    }

    #[test]
    fn test_wire_round_trip_keeps_tag_valid() {
        let signer = signer();
        let signed = signer.sign(SessionPayload {
            user_id: Some(9),
            items: vec![OrderItem::new(1, 3, 120), OrderItem::new(2, 0, 999)],
            auth_tag: None,
        });

        let wire = serde_json::to_string(&signed).unwrap();
        let back: SessionPayload = serde_json::from_str(&wire).unwrap();

        assert!(signer.verify(&back));
    }

    #[test]
    fn test_secret_longer_than_block_size() {
        // HMAC-SHA256 hashes keys beyond 64 bytes; both paths must sign.
        let long = SessionSigner::new(vec![7u8; 200]).unwrap();
        let same = SessionSigner::new(vec![7u8; 200]).unwrap();

        let signed = long.sign(payload());

        assert!(long.verify(&signed));
        assert!(same.verify(&signed));
        assert!(!signer().verify(&signed));
    }

    #[test]
    fn test_cloned_signer_keeps_key() {
        let keyed = signer();
        let cloned = keyed.clone();

        let first = keyed.sign(payload());
        let second = cloned.sign(payload());

        assert_eq!(first.auth_tag, second.auth_tag);
    }
}
