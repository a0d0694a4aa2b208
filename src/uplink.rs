//! コレクターへの送信
//!
//! 正規化済みバッチを1回のJSON POSTでリモートコレクターへ送る。
//! 失敗は固定バックオフ付きの有限リトライで吸収し、それでも失敗した
//! 場合はバッチを破棄する（ローカルに滞留させない）。

use crate::config::FeederConfig;
use crate::error::{FeederError, FeederResult};
use crate::shutdown::ShutdownController;
use crate::types::AircraftReport;
use std::time::Duration;
use tracing::{debug, info, warn};

/// コレクターへのアップリンク送信器
pub struct UplinkSender {
    client: reqwest::Client,
    url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl UplinkSender {
    /// Create a sender with the per-attempt timeout baked into the client.
    pub fn new(config: &FeederConfig) -> FeederResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.send_timeout)
            .build()
            .map_err(|e| FeederError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.collector_url.clone(),
            max_attempts: config.send_attempts.max(1),
            backoff: config.backoff,
        })
    }

    /// バッチを送信する
    ///
    /// 空バッチはネットワークに触れず即成功。リトライを使い切った場合は
    /// `Err`を返すが、呼び出し側はこれを致命的エラーとは扱わない
    /// （バッチは破棄され、ループは継続する）。
    pub async fn send(
        &self,
        batch: &[AircraftReport],
        shutdown: &ShutdownController,
    ) -> FeederResult<()> {
        if batch.is_empty() {
            debug!("Empty batch, nothing to send");
            return Ok(());
        }

        let mut last_error = FeederError::Internal("send not attempted".to_string());

        for attempt in 1..=self.max_attempts {
            debug!(
                attempt,
                max_attempts = self.max_attempts,
                count = batch.len(),
                "Sending aircraft reports"
            );

            match self.try_send(batch).await {
                Ok(()) => {
                    info!(count = batch.len(), "Aircraft reports sent");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Send attempt failed"
                    );
                    last_error = e;
                }
            }

            if attempt < self.max_attempts && !shutdown.sleep(self.backoff).await {
                debug!("Shutdown requested during send backoff");
                break;
            }
        }

        Err(last_error)
    }

    async fn try_send(&self, batch: &[AircraftReport]) -> FeederResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(batch)
            .send()
            .await
            .map_err(|e| FeederError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeederError::Http(format!("HTTP {}", response.status())));
        }

        Ok(())
    }
}
