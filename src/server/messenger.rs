use anyhow::anyhow;
use flume::{Receiver, Sender, TrySendError};
use tracing::{info, warn};

use crate::reply::Reply;

/// Posts a message into a space outside the request/response cycle.
pub trait Messenger: Send + Sync {
    fn create_message(&self, space: &str, reply: Reply) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub space: String,
    pub reply: Reply,
}

/// Messenger backed by a bounded queue; a delivery task drains the other end.
pub struct QueuedMessenger {
    sink: Sender<OutboundMessage>,
}

impl QueuedMessenger {
    pub fn new(capacity: usize) -> (Self, Receiver<OutboundMessage>) {
        let (sink, outbound) = flume::bounded(capacity);
        (QueuedMessenger { sink }, outbound)
    }
}

impl Messenger for QueuedMessenger {
    fn create_message(&self, space: &str, reply: Reply) -> anyhow::Result<()> {
        let message = OutboundMessage {
            space: space.to_string(),
            reply,
        };
        match self.sink.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let len = self.sink.len();
                warn!(space, queued = len, "[Messenger]Outbound queue is full");
                Err(anyhow!("outbound queue is full ({len} messages)"))
            }
            Err(TrySendError::Disconnected(_)) => Err(anyhow!("outbound queue is closed")),
        }
    }
}

/// Drains queued messages until every sender is gone.
///
/// Delivery to the chat platform API belongs to the platform client; this
/// loop hands it the serialized `spaces.messages.create` body.
pub async fn delivery_loop(outbound: Receiver<OutboundMessage>) {
    while let Ok(message) = outbound.recv_async().await {
        match serde_json::to_string(&message.reply) {
            Ok(body) => info!(space = %message.space, %body, "[Messenger]Posting message"),
            Err(err) => warn!(space = %message.space, %err, "[Messenger]Cannot serialize message"),
        }
    }
    info!("[Messenger]Outbound queue closed");
}
