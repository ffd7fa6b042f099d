use crate::{VoxdemoError, VoxdemoResult};

/// Builds the shareable demo URL for an agent: `<origin>/demo/<agent_id>`.
///
/// The agent id is trimmed but otherwise taken verbatim; it is an opaque
/// identifier and no pattern validation is applied. A blank id is rejected
/// before any URL is produced.
pub fn demo_url(origin: &str, agent_id: &str) -> VoxdemoResult<String> {
    let agent_id = agent_id.trim();
    if agent_id.is_empty() {
        return Err(VoxdemoError::Config("Please enter an agent ID".into()));
    }
    let origin = origin.trim_end_matches('/');
    Ok(format!("{origin}/demo/{agent_id}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_url_from_origin_and_agent_id() {
        let url = demo_url("https://demo.example.com", "agent_abc123xyz").unwrap();
        assert_eq!(url, "https://demo.example.com/demo/agent_abc123xyz");
    }

    #[test]
    fn trims_agent_id_and_trailing_slash() {
        let url = demo_url("https://demo.example.com/", "  agent_abc123  ").unwrap();
        assert_eq!(url, "https://demo.example.com/demo/agent_abc123");
    }

    #[test]
    fn rejects_blank_agent_id() {
        assert!(demo_url("https://demo.example.com", "   ").is_err());
        assert!(demo_url("https://demo.example.com", "").is_err());
    }

    #[test]
    fn agent_id_is_not_pattern_validated() {
        // Opaque ids pass through untouched, whatever they look like.
        let url = demo_url("http://localhost:5173", "not-a-retell-id").unwrap();
        assert_eq!(url, "http://localhost:5173/demo/not-a-retell-id");
    }
}
