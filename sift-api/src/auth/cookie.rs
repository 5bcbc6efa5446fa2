//! Signed session cookies
//!
//! The cookie value is `<session id>.<hex HMAC-SHA256 of the id>`. The
//! signature keeps clients from forging session IDs; the session itself
//! still has to exist in storage to be accepted.

use axum::http::{HeaderMap, HeaderValue, header};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    /// No session cookie on the request
    #[error("missing session cookie")]
    Missing,
    /// The value is not `<uuid>.<hex>`
    #[error("malformed session cookie")]
    Malformed,
    /// The signature does not match the ID
    #[error("invalid session cookie signature")]
    BadSignature,
}

/// Signs and verifies session cookies with a process-wide key
#[derive(Clone)]
pub struct SessionCookie {
    key: Vec<u8>,
}

impl SessionCookie {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Builds a key that only lives as long as the process
    ///
    /// Sessions signed with it do not survive a restart.
    pub fn ephemeral() -> Self {
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        Self { key }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }

    pub fn encode(&self, session_id: Uuid) -> String {
        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        format!(
            "{}.{}",
            session_id,
            hex::encode(mac.finalize().into_bytes())
        )
    }

    pub fn decode(&self, value: &str) -> Result<Uuid, CookieError> {
        let (id, signature) = value.split_once('.').ok_or(CookieError::Malformed)?;
        let id = Uuid::parse_str(id).map_err(|_| CookieError::Malformed)?;
        let signature = hex::decode(signature).ok_or(CookieError::Malformed)?;

        let mut mac = self.mac();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CookieError::BadSignature)?;

        Ok(id)
    }

    /// Reads and verifies the session cookie from request headers
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<Uuid, CookieError> {
        let value = find_cookie(headers, SESSION_COOKIE).ok_or(CookieError::Missing)?;
        self.decode(value)
    }

    /// `Set-Cookie` value establishing a session
    pub fn set_header(&self, session_id: Uuid) -> HeaderValue {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.encode(session_id)
        );
        HeaderValue::from_str(&cookie).expect("UUIDs and hex digits are valid header characters")
    }

    /// `Set-Cookie` value expiring the session cookie
    pub fn clear_header() -> HeaderValue {
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

// ---------------------------------------------------------------------------
// hex encoding helper
// ---------------------------------------------------------------------------

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies() -> SessionCookie {
        SessionCookie::new(b"0123456789abcdef0123456789abcdef".to_vec())
    }

    #[test]
    fn test_encode_decode() {
        let id = Uuid::new_v4();
        let value = cookies().encode(id);
        assert_eq!(cookies().decode(&value), Ok(id));
    }

    #[test]
    fn test_tampered_signature() {
        let id = Uuid::new_v4();
        let value = cookies().encode(id);
        let other = Uuid::new_v4();
        let (_, sig) = value.split_once('.').unwrap();

        assert_eq!(
            cookies().decode(&format!("{other}.{sig}")),
            Err(CookieError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_key() {
        let value = cookies().encode(Uuid::new_v4());
        assert_eq!(
            SessionCookie::ephemeral().decode(&value),
            Err(CookieError::BadSignature)
        );
    }

    #[test]
    fn test_malformed() {
        let c = cookies();
        assert_eq!(c.decode("no-dot"), Err(CookieError::Malformed));
        assert_eq!(c.decode("not-a-uuid.abcd"), Err(CookieError::Malformed));
        let id = Uuid::new_v4();
        assert_eq!(c.decode(&format!("{id}.zz")), Err(CookieError::Malformed));
        assert_eq!(c.decode(&format!("{id}.abc")), Err(CookieError::Malformed));
    }

    #[test]
    fn test_verify_headers() {
        let c = cookies();
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert_eq!(c.verify_headers(&headers), Err(CookieError::Missing));

        let raw = format!("theme=dark; {SESSION_COOKIE}={}", c.encode(id));
        headers.insert(header::COOKIE, HeaderValue::from_str(&raw).unwrap());
        assert_eq!(c.verify_headers(&headers), Ok(id));
    }

    #[test]
    fn test_set_header_attributes() {
        let id = Uuid::new_v4();
        let header = cookies().set_header(id);
        let header = header.to_str().unwrap();
        assert_eq!(
            header,
            format!("session={}; Path=/; HttpOnly; SameSite=Lax", cookies().encode(id))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CookieError::Missing.to_string(), "missing session cookie");
        assert_eq!(
            CookieError::BadSignature.to_string(),
            "invalid session cookie signature"
        );
        let err: Box<dyn std::error::Error> = Box::new(CookieError::Malformed);
        assert_eq!(err.to_string(), "malformed session cookie");
    }
}
