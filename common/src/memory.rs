//! In-process queue endpoint, mainly for examples and downstream tests.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use parking_lot::Mutex;

use crate::{
    endpoint::{DeleteBatchResponse, EndpointClient, ReceiveResponse, SendResponse},
    types::{DeleteEntry, Message, QueueEndpoint, StatusCode},
};

struct Stored {
    id: String,
    body: String,
    receipt_handle: String,
    deliveries: u64,
}

#[derive(Default)]
struct Inner {
    queues: HashMap<QueueEndpoint, Vec<Stored>>,
    next_id: u64,
}

/// [`EndpointClient`] backed by process memory.
///
/// Receive does not remove messages, it hands out a fresh receipt handle per
/// delivery; a message leaves the store only through `delete_batch` with the
/// handle of its latest delivery. There is no visibility timeout: an
/// unacknowledged message is returned again by the next receive.
#[derive(Clone, Default)]
pub struct InMemoryEndpoint {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently held for `endpoint`.
    pub fn len(&self, endpoint: &QueueEndpoint) -> usize {
        self.inner
            .lock()
            .queues
            .get(endpoint)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, endpoint: &QueueEndpoint) -> bool {
        self.len(endpoint) == 0
    }
}

impl EndpointClient for InMemoryEndpoint {
    type Error = Infallible;

    async fn send(
        &self,
        endpoint: &QueueEndpoint,
        body: String,
    ) -> Result<SendResponse, Self::Error> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = format!("mid-{}", inner.next_id);
        inner.queues.entry(endpoint.clone()).or_default().push(Stored {
            id,
            body,
            receipt_handle: String::new(),
            deliveries: 0,
        });
        Ok(SendResponse {
            status: StatusCode::OK,
        })
    }

    async fn receive(
        &self,
        endpoint: &QueueEndpoint,
        max_messages: usize,
    ) -> Result<ReceiveResponse, Self::Error> {
        let mut inner = self.inner.lock();
        let mut messages = Vec::new();
        if let Some(queue) = inner.queues.get_mut(endpoint) {
            for stored in queue.iter_mut().take(max_messages) {
                stored.deliveries += 1;
                stored.receipt_handle = format!("rh-{}-{}", stored.id, stored.deliveries);
                messages.push(Message {
                    id: stored.id.clone(),
                    body: stored.body.clone(),
                    receipt_handle: stored.receipt_handle.clone(),
                });
            }
        }
        Ok(ReceiveResponse {
            status: StatusCode::OK,
            messages,
        })
    }

    async fn delete_batch(
        &self,
        endpoint: &QueueEndpoint,
        entries: Vec<DeleteEntry>,
    ) -> Result<DeleteBatchResponse, Self::Error> {
        let mut inner = self.inner.lock();
        let mut deleted_ids = Vec::new();
        if let Some(queue) = inner.queues.get_mut(endpoint) {
            for entry in &entries {
                let matched = queue
                    .iter()
                    .position(|s| s.id == entry.id && s.receipt_handle == entry.receipt_handle);
                if let Some(index) = matched {
                    queue.remove(index);
                    deleted_ids.push(entry.id.clone());
                }
            }
        }
        Ok(DeleteBatchResponse {
            status: StatusCode::OK,
            deleted_ids,
        })
    }
}
