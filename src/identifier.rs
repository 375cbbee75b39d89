// src/identifier.rs

use crate::error::{Result, UsageLimitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How usage is attributed to a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMethod {
    /// One counter per user across the whole workspace
    #[default]
    WorkspaceUser,
    /// One counter per user within the current app
    AppUser,
    /// One counter shared by every user of the current app
    App,
    /// One counter per conversation
    Conversation,
}

impl TrackingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMethod::WorkspaceUser => "workspace-user",
            TrackingMethod::AppUser => "app-user",
            TrackingMethod::App => "app",
            TrackingMethod::Conversation => "conversation",
        }
    }

    /// Parses an optional token; an absent token means [`TrackingMethod::WorkspaceUser`]
    pub fn from_token(token: Option<&str>) -> Result<Self> {
        token.map_or(Ok(TrackingMethod::default()), |t| t.parse())
    }
}

impl FromStr for TrackingMethod {
    type Err = UsageLimitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "workspace-user" => Ok(TrackingMethod::WorkspaceUser),
            "app-user" => Ok(TrackingMethod::AppUser),
            "app" => Ok(TrackingMethod::App),
            "conversation" => Ok(TrackingMethod::Conversation),
            other => Err(UsageLimitError::InvalidTrackingMethod(other.to_string())),
        }
    }
}

impl fmt::Display for TrackingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity facts supplied by the host for the current call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub app_id: String,
    pub conversation_id: String,
}

impl SessionContext {
    pub fn new(app_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            conversation_id: conversation_id.into(),
        }
    }
}

/// Maps a user identity and tracking mode to the storage key for that subject.
///
/// `app-user` concatenates app and user identity with no separator, so
/// callers must not rely on the two parts being recoverable.
pub fn resolve_identifier(
    user_id: &str,
    tracking_method: Option<&str>,
    session: &SessionContext,
) -> Result<String> {
    let method = TrackingMethod::from_token(tracking_method)?;

    let identifier = match method {
        TrackingMethod::WorkspaceUser => user_id.to_string(),
        TrackingMethod::AppUser => format!("{}{}", session.app_id, user_id),
        TrackingMethod::App => session.app_id.clone(),
        TrackingMethod::Conversation => session.conversation_id.clone(),
    };

    if identifier.is_empty() {
        return Err(UsageLimitError::EmptyIdentifier(method.to_string()));
    }

    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionContext {
        SessionContext::new("app123", "conv456")
    }

    #[test]
    fn test_resolves_each_tracking_method() {
        let session = session();
        let cases = [
            (Some("workspace-user"), "user789"),
            (Some("app-user"), "app123user789"),
            (Some("app"), "app123"),
            (Some("conversation"), "conv456"),
            (None, "user789"),
        ];

        for (method, expected) in cases {
            let identifier = resolve_identifier("user789", method, &session).unwrap();
            assert_eq!(identifier, expected, "method {:?}", method);
        }
    }

    #[test]
    fn test_rejects_unknown_tracking_method() {
        let err = resolve_identifier("user789", Some("invalid_method"), &session()).unwrap_err();
        assert!(matches!(
            err,
            UsageLimitError::InvalidTrackingMethod(ref token) if token == "invalid_method"
        ));
    }

    #[test]
    fn test_rejects_empty_identifier() {
        let err = resolve_identifier("user789", Some("app"), &SessionContext::default()).unwrap_err();
        assert!(matches!(err, UsageLimitError::EmptyIdentifier(ref m) if m == "app"));

        let err = resolve_identifier("", None, &session()).unwrap_err();
        assert!(matches!(err, UsageLimitError::EmptyIdentifier(_)));
    }

    #[test]
    fn test_tracking_method_round_trips_through_display() {
        for method in [
            TrackingMethod::WorkspaceUser,
            TrackingMethod::AppUser,
            TrackingMethod::App,
            TrackingMethod::Conversation,
        ] {
            assert_eq!(method.to_string().parse::<TrackingMethod>().unwrap(), method);
        }
    }
}
