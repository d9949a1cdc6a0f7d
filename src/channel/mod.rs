//! The broadcast text channel the session talks over.
//!
//! A channel delivers every text it hears, including this peer's own
//! transmissions when the medium is shared. It gives no addressing, ordering
//! or delivery guarantee.

#[async_trait::async_trait]
pub trait Channel: Send {
    /// Acquire the underlying input/output resources.
    async fn initialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Best-effort transmission of one text payload.
    async fn send(&mut self, text: &str) -> anyhow::Result<()>;

    /// Next text payload heard on the medium.
    async fn recv(&mut self) -> anyhow::Result<String>;

    /// Release resources acquired by `initialize`.
    async fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub mod in_memory;
pub mod line;

pub use in_memory::{AirChannel, InMemoryMedium};
pub use line::LineChannel;
