use std::future::Future;

use courier_common::types::Message;
use futures::future;
use tokio_util::sync::CancellationToken;

/// Per-message predicate deciding whether one delivery was consumed.
///
/// `Ok(true)` marks the message safe to acknowledge, `Ok(false)` leaves it on
/// the queue for redelivery. An `Err` is unrecoverable and aborts the whole
/// subscribe call. Implemented for any async closure
/// `Fn(Message, CancellationToken) -> Result<bool, E>`.
pub trait MessageConsumer: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn consume(
        &self,
        message: Message,
        token: CancellationToken,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

impl<F, Fut, E> MessageConsumer for F
where
    F: Fn(Message, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn consume(
        &self,
        message: Message,
        token: CancellationToken,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        (self)(message, token)
    }
}

/// Batch form of the consumer capability; the polling loop is written against
/// this trait only.
///
/// `verdicts` is aligned index-for-index with `messages` and arrives all
/// `false`; a slot left untouched means "not consumed". On `Err` no verdict
/// of the batch is acknowledged.
pub trait BatchConsumer: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn consume_batch(
        &self,
        messages: &[Message],
        verdicts: &mut [bool],
        token: CancellationToken,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Adapts a per-message [`MessageConsumer`] to [`BatchConsumer`] by invoking
/// it concurrently across the whole batch.
pub struct FanOut<C> {
    consumer: C,
}

impl<C> FanOut<C> {
    pub fn new(consumer: C) -> Self {
        Self { consumer }
    }
}

impl<C> BatchConsumer for FanOut<C>
where
    C: MessageConsumer,
{
    type Error = C::Error;

    async fn consume_batch(
        &self,
        messages: &[Message],
        verdicts: &mut [bool],
        token: CancellationToken,
    ) -> Result<(), Self::Error> {
        debug_assert_eq!(messages.len(), verdicts.len());

        let invocations = messages
            .iter()
            .map(|message| self.consumer.consume(message.clone(), token.clone()));
        // join_all keeps the verdicts in batch order whatever the completion
        // order, and lets every invocation settle before the first error is
        // propagated.
        let results = future::join_all(invocations).await;

        for (slot, result) in verdicts.iter_mut().zip(results) {
            *slot = result?;
        }
        Ok(())
    }
}
