use std::{sync::Arc, time::Duration};

use courier_common::{
    endpoint::EndpointClient,
    types::{DeleteEntry, Message, QueueEndpoint},
    BoxError,
};
use snafu::IntoError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    channel::{BatchConsumer, FanOut, InputChannel, MessageConsumer, OutputChannel},
    CancelledSnafu, ConsumerSnafu, EndpointFaultSnafu, EndpointStatusSnafu, Error,
    InvalidArgumentSnafu, Operation,
};

/// Most messages one receive call may request, imposed by the backing
/// service.
pub const BATCH_CEILING: usize = 10;

/// Upper bound of the idle backoff, the millisecond range of the reference
/// backend's wait primitive.
pub const MAX_IDLE_BACKOFF: Duration = Duration::from_millis(i32::MAX as u64);

type StatusSink = Arc<dyn Fn(&str) + Send + Sync>;

pub struct QueueChannelBuilder<E> {
    client: E,
    endpoint: QueueEndpoint,
    idle_backoff: Duration,
    status_sink: Option<StatusSink>,
}

impl<E> QueueChannelBuilder<E>
where
    E: EndpointClient,
{
    /// Wait applied after an empty receive before polling again.
    pub fn idle_backoff(mut self, idle_backoff: Duration) -> Self {
        self.idle_backoff = idle_backoff;
        self
    }

    /// Optional sink receiving one human-readable line per loop event. Absent
    /// by default, in which case nothing is emitted.
    pub fn status_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.status_sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> Result<QueueChannel<E>, Error> {
        if self.endpoint.is_empty() {
            return InvalidArgumentSnafu {
                message: "queue endpoint handle is empty",
            }
            .fail();
        }
        if self.idle_backoff > MAX_IDLE_BACKOFF {
            return InvalidArgumentSnafu {
                message: format!(
                    "idle backoff {:?} exceeds the representable maximum {:?}",
                    self.idle_backoff, MAX_IDLE_BACKOFF
                ),
            }
            .fail();
        }
        Ok(QueueChannel {
            client: self.client,
            endpoint: self.endpoint,
            idle_backoff: self.idle_backoff,
            status_sink: self.status_sink,
        })
    }
}

/// Message channel backed by a pull-based queue service.
///
/// Delivery is at-least-once: a message whose acknowledgment fails, or whose
/// consumer verdict is `false`, is redelivered by the backend.
#[derive(Clone)]
pub struct QueueChannel<E> {
    client: E,
    endpoint: QueueEndpoint,
    idle_backoff: Duration,
    status_sink: Option<StatusSink>,
}

impl<E: std::fmt::Debug> std::fmt::Debug for QueueChannel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueChannel")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint)
            .field("idle_backoff", &self.idle_backoff)
            .finish_non_exhaustive()
    }
}

impl<E> QueueChannel<E>
where
    E: EndpointClient,
{
    pub fn builder(client: E, endpoint: impl Into<QueueEndpoint>) -> QueueChannelBuilder<E> {
        QueueChannelBuilder {
            client,
            endpoint: endpoint.into(),
            idle_backoff: Duration::from_secs(1),
            status_sink: None,
        }
    }

    pub fn endpoint(&self) -> &QueueEndpoint {
        &self.endpoint
    }

    /// [`OutputChannel::subscribe`] with the per-message predicate style:
    /// `consumer` is fanned out concurrently over each received batch.
    pub async fn subscribe_each<M>(
        &self,
        consumer: M,
        token: CancellationToken,
    ) -> Result<(), Error>
    where
        M: MessageConsumer + 'static,
    {
        self.subscribe(FanOut::new(consumer), token).await
    }
}

impl<E> InputChannel for QueueChannel<E>
where
    E: EndpointClient,
{
    #[tracing::instrument(skip(self, body, token), fields(endpoint = %self.endpoint))]
    async fn post(&self, body: String, token: CancellationToken) -> Result<(), Error> {
        if token.is_cancelled() {
            return CancelledSnafu.fail();
        }
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return CancelledSnafu.fail(),
            result = self.client.send(&self.endpoint, body) => result.map_err(|error| {
                EndpointFaultSnafu { op: Operation::Send }.into_error(Box::new(error) as BoxError)
            })?,
        };
        if response.status.is_failure() {
            return EndpointStatusSnafu {
                op: Operation::Send,
                status: response.status,
            }
            .fail();
        }
        Ok(())
    }
}

impl<E> OutputChannel for QueueChannel<E>
where
    E: EndpointClient,
{
    #[tracing::instrument(skip(self, consumer, token), fields(endpoint = %self.endpoint))]
    async fn subscribe<C>(&self, consumer: C, token: CancellationToken) -> Result<(), Error>
    where
        C: BatchConsumer + 'static,
    {
        let poll = PollLoop {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            idle_backoff: self.idle_backoff,
            status_sink: self.status_sink.clone(),
            consumer,
        };
        // dedicated task, the subscriber's own task never runs the loop; a
        // panic escaping the consumer comes back as the join error
        tokio::spawn(poll.run(token))
            .await
            .map_err(|error| ConsumerSnafu.into_error(Box::new(error) as BoxError))?
    }
}

struct PollLoop<E, C> {
    client: E,
    endpoint: QueueEndpoint,
    idle_backoff: Duration,
    status_sink: Option<StatusSink>,
    consumer: C,
}

impl<E, C> PollLoop<E, C>
where
    E: EndpointClient,
    C: BatchConsumer,
{
    async fn run(self, token: CancellationToken) -> Result<(), Error> {
        loop {
            if token.is_cancelled() {
                return CancelledSnafu.fail();
            }

            let messages = self.bulk_receive(BATCH_CEILING, &token).await?;
            if messages.is_empty() {
                debug!(endpoint = %self.endpoint, "queue is idle");
                self.emit("no message");
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return CancelledSnafu.fail(),
                    _ = tokio::time::sleep(self.idle_backoff) => {}
                }
                continue;
            }

            let mut verdicts = vec![false; messages.len()];
            if let Err(error) = self
                .consumer
                .consume_batch(&messages, &mut verdicts, token.clone())
                .await
            {
                if token.is_cancelled() {
                    return CancelledSnafu.fail();
                }
                return Err(ConsumerSnafu.into_error(Box::new(error) as BoxError));
            }
            if token.is_cancelled() {
                return CancelledSnafu.fail();
            }

            let consumed: Vec<&Message> = messages
                .iter()
                .zip(&verdicts)
                .filter(|(_, verdict)| **verdict)
                .map(|(message, _)| message)
                .collect();
            let deleted = self.bulk_delete(&consumed, &token).await?;
            if deleted < consumed.len() {
                // the unconfirmed remainder is redelivered by the backend
                warn!(
                    endpoint = %self.endpoint,
                    requested = consumed.len(),
                    deleted,
                    "batch delete confirmed only part of the entries"
                );
            }
            self.emit(&format!(
                "({BATCH_CEILING}, {}, {}, {deleted})",
                messages.len(),
                consumed.len(),
            ));
        }
    }

    async fn bulk_receive(
        &self,
        limit: usize,
        token: &CancellationToken,
    ) -> Result<Vec<Message>, Error> {
        debug_assert!((1..=BATCH_CEILING).contains(&limit));

        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return CancelledSnafu.fail(),
            result = self.client.receive(&self.endpoint, limit) => result.map_err(|error| {
                EndpointFaultSnafu { op: Operation::Receive }.into_error(Box::new(error) as BoxError)
            })?,
        };
        // a cancel that fired while the call was in flight wins over its result
        if token.is_cancelled() {
            return CancelledSnafu.fail();
        }
        if response.status.is_failure() {
            return EndpointStatusSnafu {
                op: Operation::Receive,
                status: response.status,
            }
            .fail();
        }
        Ok(response.messages)
    }

    /// Deletes the consumed subset in one batched request and returns the
    /// count the endpoint confirmed. An empty subset costs no network call.
    async fn bulk_delete(
        &self,
        consumed: &[&Message],
        token: &CancellationToken,
    ) -> Result<usize, Error> {
        let entries: Vec<DeleteEntry> = consumed
            .iter()
            .map(|message| DeleteEntry::for_message(message))
            .collect();
        if entries.is_empty() {
            return Ok(0);
        }

        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return CancelledSnafu.fail(),
            result = self.client.delete_batch(&self.endpoint, entries) => result.map_err(|error| {
                EndpointFaultSnafu { op: Operation::DeleteBatch }.into_error(Box::new(error) as BoxError)
            })?,
        };
        // a cancel that fired while the call was in flight wins over its result
        if token.is_cancelled() {
            return CancelledSnafu.fail();
        }
        if response.status.is_failure() {
            return EndpointStatusSnafu {
                op: Operation::DeleteBatch,
                status: response.status,
            }
            .fail();
        }
        Ok(response.deleted_ids.len())
    }

    fn emit(&self, line: &str) {
        if let Some(sink) = &self.status_sink {
            sink(line);
        }
    }
}
