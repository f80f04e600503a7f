use std::time::Duration;

use courier_client::channel::{InputChannel, QueueChannel};
use courier_common::{
    memory::InMemoryEndpoint,
    types::{Message, QueueEndpoint},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), courier_client::Error> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let client = InMemoryEndpoint::new();
    let endpoint = QueueEndpoint::from("memory://orders");
    let channel = QueueChannel::builder(client.clone(), endpoint.clone())
        .idle_backoff(Duration::from_millis(200))
        .status_sink(|line| info!(target: "channel::status", "{line}"))
        .build()?;

    let token = CancellationToken::new();
    for n in 0..25 {
        channel.post(format!("order #{n}"), token.clone()).await?;
    }

    let subscription = {
        let channel = channel.clone();
        let token = token.clone();
        tokio::spawn(async move {
            channel
                .subscribe_each(
                    |message: Message, _token: CancellationToken| async move {
                        info!(id = %message.id, body = %message.body, "consumed");
                        Ok::<bool, std::convert::Infallible>(true)
                    },
                    token,
                )
                .await
        })
    };

    while !client.is_empty(&endpoint) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    token.cancel();

    match subscription.await.expect("subscription task panicked") {
        Err(error) if error.is_cancelled() => info!("subscription stopped"),
        other => other?,
    }
    Ok(())
}
