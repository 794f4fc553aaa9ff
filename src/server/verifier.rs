use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Issuer of every bearer token the chat platform attaches to app requests.
pub const CHAT_ISSUER: &str = "chat@system.gserviceaccount.com";
pub const FAILED_VERIFICATION: &str = "Failed verification!";

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("no verification key for kid {0:?}")]
    UnknownKey(Option<String>),
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token was not issued by chat@system.gserviceaccount.com")]
    WrongIssuer,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatClaims {
    iss: String,
    #[serde(default)]
    email: Option<String>,
}

/// Checks the `Authorization: Bearer` ID token of an incoming request.
///
/// Tokens minted for an app URL audience carry the chat issuer in `email`;
/// tokens minted for a project number audience carry it in `iss`. Either is
/// accepted.
pub struct RequestVerifier {
    keys: Vec<(Option<String>, DecodingKey)>,
    validation: Validation,
}

impl RequestVerifier {
    pub fn new(
        audience: &str,
        algorithm: Algorithm,
        keys: Vec<(Option<String>, DecodingKey)>,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        RequestVerifier { keys, validation }
    }

    pub fn from_jwks(audience: &str, jwks: &JwkSet) -> anyhow::Result<Self> {
        let keys = jwks
            .keys
            .iter()
            .map(|jwk| Ok((jwk.common.key_id.clone(), DecodingKey::from_jwk(jwk)?)))
            .collect::<Result<Vec<_>, jsonwebtoken::errors::Error>>()?;
        Ok(Self::new(audience, Algorithm::RS256, keys))
    }

    /// Downloads the signing keys once; they are not refreshed afterwards.
    pub async fn fetch(audience: &str, keys_url: &str) -> anyhow::Result<Self> {
        let jwks: JwkSet = reqwest::get(keys_url)
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(keys = jwks.keys.len(), url = keys_url, "[Verifier]Loaded verification keys");
        Self::from_jwks(audience, &jwks)
    }

    pub fn verify(&self, authorization: Option<&str>) -> Result<(), VerificationError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(VerificationError::MissingToken)?;
        let kid = decode_header(token)?.kid;
        let mut candidates = self
            .keys
            .iter()
            .filter(|(key_id, _)| kid.is_none() || key_id.is_none() || *key_id == kid)
            .map(|(_, key)| key)
            .peekable();
        if candidates.peek().is_none() {
            return Err(VerificationError::UnknownKey(kid.clone()));
        }

        let mut last_error = None;
        for key in candidates {
            match decode::<ChatClaims>(token, key, &self.validation) {
                Ok(data) => {
                    let claims = data.claims;
                    if claims.iss == CHAT_ISSUER || claims.email.as_deref() == Some(CHAT_ISSUER) {
                        return Ok(());
                    }
                    return Err(VerificationError::WrongIssuer);
                }
                Err(err) => last_error = Some(err),
            }
        }
        Err(last_error.map_or(VerificationError::UnknownKey(kid), VerificationError::from))
    }
}
