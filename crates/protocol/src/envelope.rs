use std::time::SystemTime;

use prost_types::Timestamp;

/// Envelope metadata attached to every message on the management plane.
///
/// The transfer core treats it as opaque: whatever the caller builds is
/// copied onto each frame of a stream unchanged.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageMeta {
    /// Unique id of this message.
    #[prost(string, tag = "1")]
    pub message_id: String,
    /// Groups messages that belong to the same workflow.
    #[prost(string, tag = "2")]
    pub correlation_id: String,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
}

impl MessageMeta {
    /// Creates an envelope with a fresh message id, stamped with the current time.
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            message_id: generate_message_id(),
            correlation_id: correlation_id.into(),
            timestamp: Some(Timestamp::from(SystemTime::now())),
        }
    }

    /// Creates an envelope answering `self`: new message id, same correlation id.
    pub fn reply(&self) -> Self {
        Self::new(self.correlation_id.clone())
    }
}

/// Generates a random message id (UUID v4, hyphenated).
pub fn generate_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
