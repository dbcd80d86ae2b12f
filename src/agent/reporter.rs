use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::SystemError;

/// Upstream channel for agent replies
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(
        &self,
        status: &str,
    ) -> Result<()>;
}

/// Writes each report as one line and flushes it.
pub struct LineReporter<W> {
    writer: Mutex<W>,
}

impl<W> LineReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Reporter for LineReporter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn report(
        &self,
        status: &str,
    ) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let line = format!("{status}\n");
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SystemError::Report(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| SystemError::Report(e.to_string()))?;
        Ok(())
    }
}
