use serde::{Deserialize, Serialize};

/// Call ID type
///
/// Explicit handle for the call being recorded. Wraps the SIP Call-ID (or any
/// stable per-call key the call engine hands out).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn new() -> Self {
        Self(format!("call-{}", uuid::Uuid::new_v4()))
    }

    /// Wrap an existing call identifier
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recording session ID type
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("rec-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dialog reference type
///
/// Opaque handle to a dialog context owned by the external dialog engine.
/// The engagement layer never looks inside it, only passes it back to the
/// engine when registering the completion callback.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DialogRef(pub String);

impl DialogRef {
    pub fn new() -> Self {
        Self(format!("dialog-{}", uuid::Uuid::new_v4()))
    }

    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for DialogRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which call leg an SDP offer was captured from
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MediaLeg {
    Caller,
    Callee,
}

impl std::fmt::Display for MediaLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Caller => write!(f, "caller"),
            Self::Callee => write!(f, "callee"),
        }
    }
}

/// Transaction event the completion trigger is armed on
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransactionEventKind {
    /// A final response left the transaction layer for this leg
    ResponseSent,
    /// The transaction reached its terminated state
    Completed,
}

impl std::fmt::Display for TransactionEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResponseSent => write!(f, "response-sent"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(CallId::new(), CallId::new());
        assert_ne!(SessionId::new(), SessionId::new());
        assert_ne!(DialogRef::new(), DialogRef::new());
    }

    #[test]
    fn call_id_wraps_existing_value() {
        let id = CallId::from_value("a84b4c76e66710@pc33.example.com");
        assert_eq!(id.as_str(), "a84b4c76e66710@pc33.example.com");
        assert_eq!(id.to_string(), "a84b4c76e66710@pc33.example.com");
    }
}
