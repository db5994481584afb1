//! Credential encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `Authorization` header value for an API token.
///
/// The token is base64-encoded as given, so pass `"<token>:"` when the
/// server expects a username/password pair.
pub fn basic_authorization(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(token.as_bytes()))
}
