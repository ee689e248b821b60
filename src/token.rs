// Bearer token helpers: short previews for the console and a best-effort
// peek at JWT claims. Claims are decoded without checking the signature;
// they are shown to the operator, never trusted.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

/// First `len` characters of `token` followed by `...`.
pub fn preview(token: &str, len: usize) -> String {
    let head: String = token.chars().take(len).collect();
    format!("{}...", head)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Seconds until `exp`, negative once expired. `None` without an `exp` claim.
    pub fn expires_in(&self, now: SystemTime) -> Option<i64> {
        let now = now.duration_since(UNIX_EPOCH).ok()?.as_secs() as i64;
        self.exp.map(|exp| exp.saturating_sub(now))
    }
}

/// Decode the payload segment of a JWT. Returns `None` for opaque tokens.
pub fn claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn preview_truncates_and_appends_ellipsis() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ab", 50), "ab...");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("ééé", 2), "éé...");
    }

    #[test]
    fn claims_are_read_from_jwt_payload() {
        let token = jwt(r#"{"sub":"alice","exp":1000}"#);
        let claims = claims(&token).unwrap();
        assert_eq!(claims.sub, Some(Value::String("alice".into())));
        assert_eq!(claims.exp, Some(1000));
        let now = UNIX_EPOCH + Duration::from_secs(400);
        assert_eq!(claims.expires_in(now), Some(600));
    }

    #[test]
    fn extreme_exp_saturates_instead_of_overflowing() {
        let claims = TokenClaims { sub: None, exp: Some(i64::MIN) };
        let now = UNIX_EPOCH + Duration::from_secs(400);
        assert_eq!(claims.expires_in(now), Some(i64::MIN));
    }

    #[test]
    fn opaque_tokens_have_no_claims() {
        assert_eq!(claims("not-a-jwt"), None);
        assert_eq!(claims("a.b"), None);
        assert_eq!(claims("a.!!!.c"), None);
    }
}
