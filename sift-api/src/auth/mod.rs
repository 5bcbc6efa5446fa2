//! Authentication
//!
//! Password hashing, signed session cookies and the extractor that turns a
//! request's cookie into the logged-in profile.

pub mod cookie;
pub mod extractor;
pub mod password;

pub use cookie::{CookieError, SessionCookie, SESSION_COOKIE};
pub use extractor::CurrentProfile;
