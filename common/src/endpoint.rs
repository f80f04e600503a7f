use std::future::Future;

use crate::types::{DeleteEntry, Message, QueueEndpoint, StatusCode};

/// Response of [`EndpointClient::send`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SendResponse {
    pub status: StatusCode,
}

/// Response of [`EndpointClient::receive`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReceiveResponse {
    pub status: StatusCode,
    pub messages: Vec<Message>,
}

/// Response of [`EndpointClient::delete_batch`].
///
/// `deleted_ids` holds only the entries the endpoint confirmed; it may be
/// shorter than the request when part of the batch failed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteBatchResponse {
    pub status: StatusCode,
    pub deleted_ids: Vec<String>,
}

/// Capability of a pull-based queue service, consumed by the channel.
///
/// Implementations bind a concrete queue backend. Every operation resolves to
/// a status outcome; transport faults are reported through `Error`. The client
/// must tolerate concurrent calls, since consumers running fanned out over a
/// batch may call back into it.
pub trait EndpointClient: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Enqueues one message body at `endpoint`.
    fn send(
        &self,
        endpoint: &QueueEndpoint,
        body: String,
    ) -> impl Future<Output = Result<SendResponse, Self::Error>> + Send;

    /// Dequeues up to `max_messages` messages from `endpoint` without
    /// acknowledging them.
    fn receive(
        &self,
        endpoint: &QueueEndpoint,
        max_messages: usize,
    ) -> impl Future<Output = Result<ReceiveResponse, Self::Error>> + Send;

    /// Acknowledges the listed deliveries in one batched request.
    fn delete_batch(
        &self,
        endpoint: &QueueEndpoint,
        entries: Vec<DeleteEntry>,
    ) -> impl Future<Output = Result<DeleteBatchResponse, Self::Error>> + Send;
}
