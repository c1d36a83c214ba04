//! ID generation utilities.

use uuid::Uuid;

/// Prefix carried by every server-minted session ID.
pub const SESSION_PREFIX: &str = "sess-";

/// Maximum accepted length of a session ID.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Mint a collision-resistant session ID (`sess-` + 32 hex chars).
pub fn session_id() -> String {
    format!("{}{}", SESSION_PREFIX, Uuid::new_v4().simple())
}

/// Check if a caller-supplied session ID is usable as a directory name.
///
/// Allows ASCII alphanumerics, `-`, `_` and `.`; rejects `.` and `..`.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = session_id();
        assert!(id.starts_with(SESSION_PREFIX));
        assert_eq!(id.len(), SESSION_PREFIX.len() + 32);
        assert!(id[SESSION_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(is_valid_session_id(&id));
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(session_id(), session_id());
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("abc"));
        assert!(is_valid_session_id("my_session-1.v2"));

        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("."));
        assert!(!is_valid_session_id(".."));
        assert!(!is_valid_session_id("../escape"));
        assert!(!is_valid_session_id("a/b"));
        assert!(!is_valid_session_id("with space"));
        assert!(!is_valid_session_id(&"x".repeat(MAX_SESSION_ID_LEN + 1)));
    }
}
