//! JWT token signer for authentication.
//!
//! Tokens carry an ordered list of string claims plus a fixed issuer and are
//! signed with RS256. The key pair is loaded once at startup from a directory
//! holding `public-key.pem` and `private-key.pem`; a signer built from the
//! public key alone can verify but not issue tokens.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::errors::{KeyLoadError, SigningError, TokenError};

/// Issuer stamped into and required from every token.
pub const ISSUER: &str = "accessgate";

const ISSUER_CLAIM: &str = "iss";

pub const PUBLIC_KEY_FILE: &str = "public-key.pem";
pub const PRIVATE_KEY_FILE: &str = "private-key.pem";

/// A single key/value fact embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub key: String,
    pub value: String,
}

impl Claim {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered sequence of claims. Keys are not forced to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Claim::new(key, value));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Value of the last non-empty claim named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|claim| claim.key == key && !claim.value.is_empty())
            .map(|claim| claim.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn check_structure(&self) -> Result<(), SigningError> {
        for claim in &self.0 {
            if claim.key.is_empty() {
                return Err(SigningError::EmptyClaimKey);
            }
            if claim.key == ISSUER_CLAIM {
                return Err(SigningError::ReservedClaim(claim.key.clone()));
            }
        }
        Ok(())
    }
}

/// Wire payload: the issuer first, then the claims in their original order.
struct SignedPayload<'a> {
    issuer: &'a str,
    claims: &'a ClaimSet,
}

impl Serialize for SignedPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.claims.len() + 1))?;
        map.serialize_entry(ISSUER_CLAIM, self.issuer)?;
        for claim in self.claims.iter() {
            map.serialize_entry(&claim.key, &claim.value)?;
        }
        map.end()
    }
}

struct DecodedPayload {
    issuer: Option<String>,
    claims: ClaimSet,
}

impl<'de> Deserialize<'de> for DecodedPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = DecodedPayload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of string claims")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut issuer = None;
                let mut claims = ClaimSet::new();

                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let serde_json::Value::String(value) = value else {
                        return Err(de::Error::custom(format!("claim '{key}' is not a string")));
                    };
                    if key == ISSUER_CLAIM {
                        issuer = Some(value);
                    } else {
                        claims.push(key, value);
                    }
                }

                Ok(DecodedPayload { issuer, claims })
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

/// Creates and verifies RS256-signed claim sets.
pub struct TokenSigner {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// Builds a signer from PEM-encoded RSA keys. Without a private key the
    /// signer only verifies.
    pub fn from_pem(
        private_key_pem: Option<&[u8]>,
        public_key_pem: &[u8],
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let encoding_key = private_key_pem
            .map(EncodingKey::from_rsa_pem)
            .transpose()?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims = HashSet::from([ISSUER_CLAIM.to_string()]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[ISSUER]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Loads `public-key.pem` and `private-key.pem` from `dir`.
    pub fn from_keys_dir(dir: &Path) -> Result<Self, KeyLoadError> {
        let public_path = dir.join(PUBLIC_KEY_FILE);
        let private_path = dir.join(PRIVATE_KEY_FILE);

        let public_pem = read_key(&public_path)?;
        let private_pem = read_key(&private_path)?;

        // Parse separately so the error names the offending file.
        EncodingKey::from_rsa_pem(&private_pem).map_err(|source| KeyLoadError::Invalid {
            path: private_path.display().to_string(),
            source,
        })?;

        Self::from_pem(Some(&private_pem), &public_pem).map_err(|source| KeyLoadError::Invalid {
            path: public_path.display().to_string(),
            source,
        })
    }

    #[cfg(test)]
    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    /// Signs `claims` together with the fixed issuer.
    pub fn create_token(&self, claims: &ClaimSet) -> Result<String, SigningError> {
        claims.check_structure()?;

        let encoding_key = self.encoding_key.as_ref().ok_or(SigningError::MissingKey)?;
        let payload = SignedPayload {
            issuer: ISSUER,
            claims,
        };

        encode(&Header::new(Algorithm::RS256), &payload, encoding_key)
            .map_err(SigningError::Encoding)
    }

    /// Verifies signature and issuer and returns the claims in signing order.
    ///
    /// Expiry is not checked here; `expiresAt` is an application claim.
    pub fn validate_token(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let data = decode::<DecodedPayload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                    TokenError::InvalidIssuer
                }
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if data.claims.issuer.as_deref() != Some(ISSUER) {
            return Err(TokenError::InvalidIssuer);
        }

        Ok(data.claims.claims)
    }
}

fn read_key(path: &Path) -> Result<Vec<u8>, KeyLoadError> {
    std::fs::read(path).map_err(|source| KeyLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, test_signer};

    fn sample_claims() -> ClaimSet {
        ClaimSet::new()
            .with("userId", "42")
            .with("createdAt", "2026-01-01 10:00:00.000000")
            .with("expiresAt", "2026-01-01 11:00:00.000000")
            .with("type", "refresh")
    }

    #[test]
    fn validate_returns_claims_in_signing_order() {
        let signer = test_signer();
        let claims = sample_claims();

        let token = signer.create_token(&claims).unwrap();
        let decoded = signer.validate_token(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn duplicate_and_empty_values_survive_round_trip() {
        let signer = test_signer();
        let claims = ClaimSet::new()
            .with("b", "")
            .with("a", "1")
            .with("a", "2");

        let token = signer.create_token(&claims).unwrap();
        let decoded = signer.validate_token(&token).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.get("a"), Some("2"));
        assert_eq!(decoded.get("b"), None);
    }

    #[test]
    fn token_has_three_segments() {
        let token = test_signer().create_token(&sample_claims()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn mutated_signature_is_rejected() {
        let signer = test_signer();
        let token = signer.create_token(&sample_claims()).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[signature_start] = if bytes[signature_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            signer.validate_token(&tampered),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = test_signer();
        let token = signer.create_token(&sample_claims()).unwrap();
        let other = signer
            .create_token(&ClaimSet::new().with("userId", "1"))
            .unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(signer.validate_token(&forged).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let result = test_signer().validate_token("not-a-token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let encoding_key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes()).unwrap();
        let token = encode(
            &Header::new(Algorithm::RS256),
            &serde_json::json!({ "iss": "someone-else", "userId": "1" }),
            &encoding_key,
        )
        .unwrap();

        let result = test_signer().validate_token(&token);
        assert!(matches!(result, Err(TokenError::InvalidIssuer)));
    }

    #[test]
    fn missing_issuer_is_rejected() {
        let encoding_key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes()).unwrap();
        let token = encode(
            &Header::new(Algorithm::RS256),
            &serde_json::json!({ "userId": "1" }),
            &encoding_key,
        )
        .unwrap();

        assert!(matches!(
            test_signer().validate_token(&token),
            Err(TokenError::InvalidIssuer)
        ));
    }

    #[test]
    fn create_rejects_structurally_invalid_claims() {
        let signer = test_signer();

        let empty_key = ClaimSet::new().with("", "value");
        assert!(matches!(
            signer.create_token(&empty_key),
            Err(SigningError::EmptyClaimKey)
        ));

        let reserved = ClaimSet::new().with("iss", "spoofed");
        assert!(matches!(
            signer.create_token(&reserved),
            Err(SigningError::ReservedClaim(_))
        ));
    }

    #[test]
    fn verify_only_signer_cannot_issue() {
        let verifier = TokenSigner::from_pem(None, TEST_PUBLIC_KEY.as_bytes()).unwrap();
        assert!(!verifier.can_sign());
        assert!(matches!(
            verifier.create_token(&sample_claims()),
            Err(SigningError::MissingKey)
        ));

        let token = test_signer().create_token(&sample_claims()).unwrap();
        assert_eq!(verifier.validate_token(&token).unwrap(), sample_claims());
    }

    #[test]
    fn loads_key_pair_from_directory() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keys");
        let signer = TokenSigner::from_keys_dir(&dir).unwrap();
        assert!(signer.can_sign());
    }

    #[test]
    fn missing_key_directory_reports_path() {
        let result = TokenSigner::from_keys_dir(Path::new("/nonexistent/keys"));
        match result {
            Err(KeyLoadError::Io { path, .. }) => assert!(path.ends_with(PUBLIC_KEY_FILE)),
            _ => panic!("expected an io error"),
        }
    }
}
