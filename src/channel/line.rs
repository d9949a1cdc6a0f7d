use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::channel::Channel;

/// Newline-delimited texts over any reader/writer pair: stdin/stdout, a pipe
/// to an external modem process, or an in-process duplex.
pub struct LineChannel<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> LineChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
        }
    }
}

#[async_trait::async_trait]
impl<R, W> Channel for LineChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        if text.contains('\n') {
            return Err(anyhow::anyhow!("Payload must be a single line"));
        }
        self.writer
            .write_all(text.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Write error: {}", e))?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        loop {
            match self.lines.next_line().await? {
                Some(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        return Ok(line.to_string());
                    }
                }
                None => return Err(anyhow::anyhow!("Input closed")),
            }
        }
    }

    async fn teardown(&mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
