use std::future::Future;

use tokio_util::sync::CancellationToken;

pub mod consumer;
pub mod queue;

pub use consumer::{BatchConsumer, FanOut, MessageConsumer};
pub use queue::{QueueChannel, QueueChannelBuilder, BATCH_CEILING, MAX_IDLE_BACKOFF};

/// Input side of a message channel.
pub trait InputChannel: Send + Sync {
    /// Posts one message to the channel.
    ///
    /// Exactly one send request is issued per call and no retry is performed;
    /// a transport failure is surfaced immediately and retry policy stays
    /// with the caller. A token fired before or during the call resolves to
    /// [`Error::Cancelled`](crate::Error::Cancelled).
    fn post(
        &self,
        body: String,
        token: CancellationToken,
    ) -> impl Future<Output = Result<(), crate::Error>> + Send;
}

/// Output side of a message channel.
pub trait OutputChannel: Send + Sync {
    /// Receives and consumes messages until `token` is cancelled.
    ///
    /// The loop runs on a dedicated task; awaiting the returned future only
    /// observes its outcome. It never terminates on its own: the call
    /// resolves with [`Error::Cancelled`](crate::Error::Cancelled), or with
    /// the transport or consumer error that aborted the cycle, in which case
    /// polling resumes only by subscribing again.
    fn subscribe<C>(
        &self,
        consumer: C,
        token: CancellationToken,
    ) -> impl Future<Output = Result<(), crate::Error>> + Send
    where
        C: BatchConsumer + 'static;
}

/// A bidirectional message channel.
pub trait MessageChannel: InputChannel + OutputChannel {}

impl<T> MessageChannel for T where T: InputChannel + OutputChannel {}
