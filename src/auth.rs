use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const SESSION_FILE: &str = "session.json";

/// Provider-issued credential kept on disk between runs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub obtained_at: i64,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now().timestamp(),
        }
    }

    pub fn is_valid(&self) -> bool {
        validate_token(&self.token, Utc::now().timestamp()) == TokenStatus::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Expired,
    Malformed,
}

/// Local check on the stored credential. A three-segment JWT has its `exp`
/// claim compared against `now`; anything else is treated as an opaque,
/// non-expiring token. The gateway's 401/403 remains the authoritative
/// rejection path.
pub fn validate_token(token: &str, now: i64) -> TokenStatus {
    let token = token.trim();
    if token.is_empty() {
        return TokenStatus::Malformed;
    }
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return TokenStatus::Valid;
    }
    let Ok(payload) = URL_SAFE_NO_PAD.decode(parts[1]) else {
        return TokenStatus::Malformed;
    };
    let Ok(claims) = serde_json::from_slice::<serde_json::Value>(&payload) else {
        return TokenStatus::Malformed;
    };
    match claims.get("exp").and_then(|v| v.as_i64()) {
        Some(exp) if exp <= now => TokenStatus::Expired,
        _ => TokenStatus::Valid,
    }
}

pub fn load_session(path: impl AsRef<Path>) -> anyhow::Result<Option<Session>> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_session(path: impl AsRef<Path>, session: &Session) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn clear_session(path: impl AsRef<Path>) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Build the provider login URL with a fresh `state` nonce appended.
pub fn login_url(auth_url: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(auth_url)?;
    url.query_pairs_mut().append_pair("state", &state_nonce());
    Ok(url)
}

fn state_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "user", "exp": exp}).to_string());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn expired_jwt_is_rejected() {
        assert_eq!(validate_token(&jwt_with_exp(999), 1000), TokenStatus::Expired);
    }

    #[test]
    fn future_jwt_is_valid() {
        assert_eq!(validate_token(&jwt_with_exp(2000), 1000), TokenStatus::Valid);
    }

    #[test]
    fn opaque_token_is_accepted() {
        assert_eq!(validate_token("plain-api-token", 1000), TokenStatus::Valid);
    }

    #[test]
    fn malformed_jwt_is_rejected() {
        assert_eq!(
            validate_token("aaa.%%%not-base64%%%.ccc", 1000),
            TokenStatus::Malformed
        );
        assert_eq!(validate_token("   ", 1000), TokenStatus::Malformed);
    }

    #[test]
    fn jwt_without_exp_never_expires() {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "none"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "user"}).to_string());
        let token = format!("{header}.{payload}.sig");
        assert_eq!(validate_token(&token, i64::MAX), TokenStatus::Valid);
    }

    #[test]
    fn session_roundtrip_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE);

        assert!(load_session(&path).expect("load missing").is_none());

        let session = Session::new("token-abc");
        save_session(&path, &session).expect("save");
        let loaded = load_session(&path).expect("load").expect("some");
        assert_eq!(loaded.token, "token-abc");

        clear_session(&path).expect("clear");
        assert!(load_session(&path).expect("load cleared").is_none());
        clear_session(&path).expect("clear twice is fine");
    }

    #[test]
    fn login_url_carries_state() {
        let url = login_url("https://auth.example/authorize?client_id=abc").expect("url");
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .expect("state param");
        assert_eq!(state.len(), 16);
        assert!(url.query_pairs().any(|(k, v)| k == "client_id" && v == "abc"));
    }
}
