//! Cookie-consent record rules.

/// The visitor was shown the notice for strictly necessary cookies.
pub const STATUS_INFORMED: &str = "INFORMED";
pub const STATUS_ACCEPTED: &str = "ACCEPTED";
pub const STATUS_REJECTED: &str = "REJECTED";

pub const VALID_STATUSES: &[&str] = &[STATUS_INFORMED, STATUS_ACCEPTED, STATUS_REJECTED];

/// Policy version recorded when the client does not send one.
pub const DEFAULT_POLICY_VERSION: &str = "v1.0";

/// Maximum stored length of a policy version.
pub const MAX_POLICY_VERSION_LENGTH: usize = 10;

/// Long enough for any textual IPv6 address.
pub const MAX_IP_LENGTH: usize = 45;

pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid consent status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

pub fn validate_policy_version(version: &str) -> Result<(), String> {
    if version.is_empty() || version.len() > MAX_POLICY_VERSION_LENGTH {
        return Err(format!(
            "Policy version must be 1-{MAX_POLICY_VERSION_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Pick the client address from proxy headers.
///
/// Uses the first entry of `X-Forwarded-For`, falling back to `X-Real-IP`.
/// The result is trimmed and truncated to [`MAX_IP_LENGTH`].
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Option<String> {
    let candidate = forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|v| !v.is_empty()))?;
    Some(candidate.chars().take(MAX_IP_LENGTH).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert!(validate_status("ACCEPTED").is_ok());
        assert!(validate_status("accepted").is_err());
    }

    #[test]
    fn policy_version_length() {
        assert!(validate_policy_version(DEFAULT_POLICY_VERSION).is_ok());
        assert!(validate_policy_version("").is_err());
        assert!(validate_policy_version("v1.0.0-beta.1").is_err());
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        assert_eq!(
            client_ip(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.1")),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn real_ip_is_fallback() {
        assert_eq!(client_ip(None, Some(" 198.51.100.2 ")), Some("198.51.100.2".to_string()));
        assert_eq!(client_ip(Some(""), None), None);
    }
}
