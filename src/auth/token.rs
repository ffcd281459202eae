//! Bearer token inspection.
//!
//! Tokens are JWTs issued by the API. Only the payload is read, to learn the
//! expiry and the user; the signature is the server's business.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};

const JWT_PAYLOAD: GeneralPurpose = GeneralPurpose::new(
  &alphabet::URL_SAFE,
  GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
  pub sub: u64,
  pub email: String,
  pub iat: i64,
  pub exp: i64,
}

/// The signed-in user as described by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
  pub id: u64,
  pub email: String,
}

/// Decode the payload segment. Returns `None` for anything malformed.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
  let payload = token.split('.').nth(1)?;
  let bytes = JWT_PAYLOAD.decode(payload).ok()?;
  serde_json::from_slice(&bytes).ok()
}

/// Whether the token is expired at `now_secs`. Undecodable tokens are expired.
pub fn is_token_expired_at(token: &str, now_secs: i64) -> bool {
  match decode_claims(token) {
    Some(claims) => claims.exp < now_secs,
    None => true,
  }
}

pub fn is_token_expired(token: &str) -> bool {
  is_token_expired_at(token, Utc::now().timestamp())
}

pub fn user_from_token(token: &str) -> Option<User> {
  decode_claims(token).map(|claims| User {
    id: claims.sub,
    email: claims.email,
  })
}

/// Build an unsigned token carrying `claims`. Test helper.
#[cfg(test)]
pub(crate) fn encode_unsigned(claims: &TokenClaims) -> String {
  use base64::engine::general_purpose::URL_SAFE_NO_PAD;

  let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
  let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
  format!("{}.{}.signature", header, payload)
}
