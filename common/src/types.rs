/// Opaque handle of the logical destination, e.g. a queue URL. Held by a
/// channel for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct QueueEndpoint(String);

impl QueueEndpoint {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for QueueEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QueueEndpoint {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

impl From<String> for QueueEndpoint {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

/// One delivery of a queued message.
///
/// `receipt_handle` identifies this delivery, not the logical message: the
/// endpoint assigns a new handle each time the message is redelivered, and
/// only the handle of the latest delivery acknowledges it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: String,
    pub body: String,
    pub receipt_handle: String,
}

/// One entry of a batched delete (acknowledge) request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteEntry {
    pub id: String,
    pub receipt_handle: String,
}

impl DeleteEntry {
    pub fn for_message(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            receipt_handle: message.receipt_handle.clone(),
        }
    }
}

/// Status outcome reported by the queue endpoint for one request.
///
/// Codes are interpreted uniformly: everything below 400 is success,
/// everything at or above it is failure, regardless of the specific code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);

    pub fn is_failure(self) -> bool {
        self.0 >= 400
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
