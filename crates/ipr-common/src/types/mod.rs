//! Shared domain types for IPR

use serde::{Deserialize, Serialize};

/// How a user account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Local account with a stored password hash
    #[default]
    Local,
    /// External credential check against the BCGSC authentication service
    Bcgsc,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Bcgsc => "bcgsc",
        }
    }
}

impl std::str::FromStr for AuthType {
    type Err = crate::IprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(AuthType::Local),
            "bcgsc" => Ok(AuthType::Bcgsc),
            other => Err(crate::IprError::Parse(format!("invalid auth type: {}", other))),
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportState {
    /// Loaded and waiting for analysis to begin
    #[default]
    Ready,
    /// Under active analysis
    Active,
    /// Data uploaded, pending review
    Uploaded,
    /// Reviewed by an analyst
    Reviewed,
    /// Signed off and delivered
    Completed,
    /// Retired from circulation
    Archived,
}

impl ReportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Uploaded => "uploaded",
            Self::Reviewed => "reviewed",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// States a report may move to from this one
    pub fn allowed_transitions(&self) -> &'static [ReportState] {
        match self {
            Self::Ready => &[Self::Active, Self::Archived],
            Self::Active => &[Self::Uploaded, Self::Archived],
            Self::Uploaded => &[Self::Reviewed, Self::Active, Self::Archived],
            Self::Reviewed => &[Self::Completed, Self::Active, Self::Archived],
            Self::Completed => &[Self::Archived],
            Self::Archived => &[],
        }
    }

    pub fn can_transition_to(&self, next: ReportState) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::str::FromStr for ReportState {
    type Err = crate::IprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "active" => Ok(Self::Active),
            "uploaded" => Ok(Self::Uploaded),
            "reviewed" => Ok(Self::Reviewed),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            other => Err(crate::IprError::InvalidState(other.to_string())),
        }
    }
}

impl std::fmt::Display for ReportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_type_round_trip() {
        assert_eq!("local".parse::<AuthType>().unwrap(), AuthType::Local);
        assert_eq!("BCGSC".parse::<AuthType>().unwrap(), AuthType::Bcgsc);
        assert!("ldap".parse::<AuthType>().is_err());
        assert_eq!(AuthType::Bcgsc.to_string(), "bcgsc");
    }

    #[test]
    fn test_report_state_parsing() {
        assert_eq!("ready".parse::<ReportState>().unwrap(), ReportState::Ready);
        assert_eq!(
            "Completed".parse::<ReportState>().unwrap(),
            ReportState::Completed
        );
        assert!("stale".parse::<ReportState>().is_err());
    }

    #[test]
    fn test_report_state_transitions() {
        assert!(ReportState::Ready.can_transition_to(ReportState::Active));
        assert!(ReportState::Uploaded.can_transition_to(ReportState::Reviewed));
        assert!(!ReportState::Archived.can_transition_to(ReportState::Ready));
        assert!(!ReportState::Ready.can_transition_to(ReportState::Completed));
    }

    #[test]
    fn test_report_state_serde() {
        let json = serde_json::to_string(&ReportState::Reviewed).unwrap();
        assert_eq!(json, r#""reviewed""#);
        let state: ReportState = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(state, ReportState::Archived);
    }
}
