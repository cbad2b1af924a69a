//! Dispatch error types
//!
//! Two layers: [`ClientError`] is what a [`VendorClient`](crate::VendorClient)
//! reports for one invocation, [`DispatchError`] is what the dispatcher
//! surfaces to its caller. Callers that need a wire-friendly shape use
//! [`DispatchError::to_structured()`].

use std::time::Duration;

use serde::Serialize;

/// How the retry executor treats a vendor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The vendor asked us to slow down. Wait, then retry.
    RateLimit,
    /// Network blip or server-side failure. Retry immediately.
    Transient,
    /// Authentication, validation, not-found. Never retried.
    Fatal,
}

/// Failure reported by the vendor client for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The client cannot perform calls at all (e.g. an offline catalog client).
    #[error("client unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Map an HTTP status reported by the vendor into a client error.
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = message.into();
        match status {
            429 => ClientError::RateLimited { retry_after },
            401 | 403 => ClientError::AuthenticationFailed(message),
            400 | 422 => ClientError::InvalidParameters(message),
            404 => ClientError::NotFound(message),
            status => ClientError::Api { status, message },
        }
    }

    /// Retry classification of this failure.
    pub fn class(&self) -> FailureClass {
        match self {
            ClientError::RateLimited { .. } => FailureClass::RateLimit,
            ClientError::Network(_) => FailureClass::Transient,
            ClientError::Api { status, .. } if *status == 408 || (500..=599).contains(status) => {
                FailureClass::Transient
            }
            _ => FailureClass::Fatal,
        }
    }

    /// Server-provided wait hint, if this is a rate-limit failure that carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClientError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// HTTP-equivalent status, where one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RateLimited { .. } => Some(429),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::AuthenticationFailed(_) => Some(401),
            ClientError::InvalidParameters(_) => Some(400),
            ClientError::NotFound(_) => Some(404),
            ClientError::Network(_) | ClientError::Unavailable(_) => None,
        }
    }
}

/// Errors surfaced by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("method '{name}' not found in section '{section}'")]
    MethodNotFound { section: String, name: String },

    #[error("section '{section}' not found")]
    SectionNotFound {
        section: String,
        available: Vec<String>,
    },

    #[error("missing required parameters for {section}.{name}: {}", missing.join(", "))]
    InvalidParameters {
        section: String,
        name: String,
        missing: Vec<String>,
    },

    #[error("write operation {section}.{name} blocked: read-only mode is enabled")]
    WriteBlocked { section: String, name: String },

    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: ClientError,
    },

    #[error("vendor API error: {0}")]
    FatalApi(#[source] ClientError),

    /// Startup-time catalog construction failed. Fatal to the process.
    #[error("registry build failed: {0}")]
    RegistryBuild(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Stable error kind, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MethodNotFound,
    InvalidParameters,
    WriteBlocked,
    RetriesExhausted,
    FatalApiError,
    RegistryBuild,
    Configuration,
}

/// Caller-facing error: kind + message + optional remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl DispatchError {
    /// Stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MethodNotFound { .. } | DispatchError::SectionNotFound { .. } => {
                ErrorKind::MethodNotFound
            }
            DispatchError::InvalidParameters { .. } => ErrorKind::InvalidParameters,
            DispatchError::WriteBlocked { .. } => ErrorKind::WriteBlocked,
            DispatchError::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            DispatchError::FatalApi(_) => ErrorKind::FatalApiError,
            DispatchError::RegistryBuild(_) => ErrorKind::RegistryBuild,
            DispatchError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Remediation hint for the caller, if there is a useful one.
    pub fn hint(&self) -> Option<String> {
        match self {
            DispatchError::SectionNotFound { available, .. } => {
                Some(format!("available sections: {}", available.join(", ")))
            }
            DispatchError::MethodNotFound { section, .. } => Some(format!(
                "use search_methods(keyword) or list_methods(section='{section}') to find the method"
            )),
            DispatchError::InvalidParameters { section, name, .. } => {
                Some(method_info_hint(section, name))
            }
            DispatchError::WriteBlocked { .. } => {
                Some("Set READ_ONLY_MODE=false to enable write operations".to_string())
            }
            DispatchError::FatalApi(ClientError::AuthenticationFailed(_)) => {
                Some("check that MERAKI_API_KEY is set and valid".to_string())
            }
            _ => None,
        }
    }

    /// Convert into the caller-facing structured form.
    pub fn to_structured(&self) -> StructuredError {
        let (attempts, status) = match self {
            DispatchError::RetriesExhausted { attempts, last } => (Some(*attempts), last.status()),
            DispatchError::FatalApi(e) => (None, e.status()),
            _ => (None, None),
        };
        StructuredError {
            kind: self.kind(),
            message: self.to_string(),
            hint: self.hint(),
            attempts,
            status,
        }
    }

    /// Attach method context to a fatal validation failure from the vendor.
    pub(crate) fn with_method_hint(self, section: &str, name: &str) -> StructuredError {
        let mut structured = self.to_structured();
        if structured.hint.is_none()
            && matches!(self, DispatchError::FatalApi(ClientError::InvalidParameters(_)))
        {
            structured.hint = Some(method_info_hint(section, name));
        }
        structured
    }
}

impl From<DispatchError> for StructuredError {
    fn from(err: DispatchError) -> Self {
        err.to_structured()
    }
}

fn method_info_hint(section: &str, name: &str) -> String {
    format!("Use get_method_info(section='{section}', method='{name}') for parameter details")
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ClientError::from_status(429, "slow down", Some(Duration::from_secs(2))),
            ClientError::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
        );
        assert!(matches!(
            ClientError::from_status(401, "bad key", None),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(400, "bad param", None),
            ClientError::InvalidParameters(_)
        ));
        assert!(matches!(
            ClientError::from_status(404, "nope", None),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(502, "bad gateway", None),
            ClientError::Api { status: 502, .. }
        ));
    }

    #[test]
    fn failure_classes() {
        assert_eq!(
            ClientError::RateLimited { retry_after: None }.class(),
            FailureClass::RateLimit
        );
        assert_eq!(
            ClientError::Network("reset".into()).class(),
            FailureClass::Transient
        );
        assert_eq!(
            ClientError::from_status(503, "down", None).class(),
            FailureClass::Transient
        );
        assert_eq!(
            ClientError::from_status(408, "timeout", None).class(),
            FailureClass::Transient
        );
        assert_eq!(
            ClientError::from_status(409, "conflict", None).class(),
            FailureClass::Fatal
        );
        assert_eq!(
            ClientError::AuthenticationFailed("x".into()).class(),
            FailureClass::Fatal
        );
        assert_eq!(
            ClientError::Unavailable("offline".into()).class(),
            FailureClass::Fatal
        );
    }

    #[test]
    fn write_blocked_carries_hint() {
        let err = DispatchError::WriteBlocked {
            section: "networks".into(),
            name: "deleteNetwork".into(),
        };
        let s = err.to_structured();
        assert_eq!(s.kind, ErrorKind::WriteBlocked);
        assert!(s.hint.unwrap().contains("READ_ONLY_MODE=false"));
    }

    #[test]
    fn retries_exhausted_reports_attempts_and_status() {
        let err = DispatchError::RetriesExhausted {
            attempts: 3,
            last: ClientError::from_status(503, "down", None),
        };
        let s = err.to_structured();
        assert_eq!(s.kind, ErrorKind::RetriesExhausted);
        assert_eq!(s.attempts, Some(3));
        assert_eq!(s.status, Some(503));
        assert!(s.message.contains("3 attempts"));
    }

    #[test]
    fn unknown_section_lists_available() {
        let err = DispatchError::SectionNotFound {
            section: "bogus".into(),
            available: vec!["networks".into(), "organizations".into()],
        };
        let s = err.to_structured();
        assert_eq!(s.kind, ErrorKind::MethodNotFound);
        assert_eq!(
            s.hint.as_deref(),
            Some("available sections: networks, organizations")
        );
    }

    #[test]
    fn vendor_validation_failure_points_at_method_info() {
        let err = DispatchError::FatalApi(ClientError::InvalidParameters("bad vlan".into()));
        let s = err.with_method_hint("switch", "updateDeviceSwitchPort");
        assert_eq!(s.kind, ErrorKind::FatalApiError);
        assert_eq!(s.status, Some(400));
        assert!(s.hint.unwrap().contains("get_method_info(section='switch'"));
    }

    #[test]
    fn structured_error_serializes_without_empty_fields() {
        let err = DispatchError::MethodNotFound {
            section: "networks".into(),
            name: "getNothing".into(),
        };
        let json = serde_json::to_value(err.to_structured()).unwrap();
        assert_eq!(json["kind"], "method_not_found");
        assert!(json.get("attempts").is_none());
        assert!(json.get("status").is_none());
    }
}
