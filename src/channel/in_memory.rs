use tokio::sync::broadcast::{self, error::RecvError};

use crate::channel::Channel;

/// Frames buffered per listener before the slowest one starts losing them.
const MEDIUM_CAPACITY: usize = 64;

/// A shared in-process medium. Everything sent by any attached channel is
/// heard by every attached channel, the sender included.
#[derive(Clone)]
pub struct InMemoryMedium {
    tx: broadcast::Sender<String>,
}

impl Default for InMemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMedium {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(MEDIUM_CAPACITY);
        Self { tx }
    }

    /// Attach a new listener/transmitter. It hears only what is sent after
    /// this call.
    pub fn attach(&self) -> AirChannel {
        AirChannel {
            tx: self.tx.clone(),
            rx: self.tx.subscribe(),
            initialized: false,
        }
    }

    /// Put a raw text on the medium, as if some unseen device transmitted it.
    pub fn inject(&self, text: &str) -> anyhow::Result<()> {
        self.tx
            .send(text.to_string())
            .map_err(|_| anyhow::anyhow!("No listeners on medium"))?;
        Ok(())
    }
}

/// One peer's endpoint on an [`InMemoryMedium`].
pub struct AirChannel {
    tx: broadcast::Sender<String>,
    rx: broadcast::Receiver<String>,
    initialized: bool,
}

#[async_trait::async_trait]
impl Channel for AirChannel {
    async fn initialize(&mut self) -> anyhow::Result<()> {
        self.initialized = true;
        Ok(())
    }

    async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        if !self.initialized {
            return Err(anyhow::anyhow!("Channel not initialized"));
        }
        // Our own receiver is always subscribed, so this only fails if it was dropped.
        self.tx
            .send(text.to_string())
            .map_err(|_| anyhow::anyhow!("Channel closed"))?;
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        if !self.initialized {
            return Err(anyhow::anyhow!("Channel not initialized"));
        }
        loop {
            match self.rx.recv().await {
                Ok(text) => return Ok(text),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("[AirChannel] missed {} frames", skipped);
                }
                Err(RecvError::Closed) => return Err(anyhow::anyhow!("Channel closed")),
            }
        }
    }

    async fn teardown(&mut self) -> anyhow::Result<()> {
        self.initialized = false;
        Ok(())
    }
}
