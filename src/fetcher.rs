//! デコーダーエンドポイントからのデータ取得
//!
//! ローカルのデコーダーHTTPエンドポイントをGETし、JSON配列として
//! パースする。失敗は固定バックオフ付きの有限リトライで吸収し、
//! トランスポートエラーをこのモジュールの外へ漏らさない。

use crate::config::FeederConfig;
use crate::error::{FeederError, FeederResult};
use crate::shutdown::ShutdownController;
use crate::types::RawAircraft;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 1回のポーリングの結果
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 有効なレコードを取得した
    Records(Vec<RawAircraft>),
    /// エンドポイントは応答したがデータが無かった（空配列・非配列）
    ///
    /// これは正常系であり、リトライしない。
    NoData,
    /// リトライ上限まで試行しても取得できなかった
    ///
    /// `NoData`とは区別される。呼び出し側はデコーダーの再起動を
    /// 検討すべきシグナルとして扱う。
    Exhausted,
}

/// デコーダーエンドポイントのフェッチャー
pub struct DataFetcher {
    client: reqwest::Client,
    url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl DataFetcher {
    /// Create a fetcher with the per-attempt timeout baked into the client.
    pub fn new(config: &FeederConfig) -> FeederResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| FeederError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.decoder_url.clone(),
            max_attempts: config.fetch_attempts.max(1),
            backoff: config.backoff,
        })
    }

    /// レコードを取得する
    ///
    /// バックオフ中のスリープはシャットダウン要求で中断され、その場合は
    /// 残りの試行を放棄して`Exhausted`を返す。
    pub async fn fetch(&self, shutdown: &ShutdownController) -> FetchOutcome {
        for attempt in 1..=self.max_attempts {
            debug!(attempt, max_attempts = self.max_attempts, "Fetching aircraft data");

            match self.try_fetch().await {
                Ok(Some(records)) => {
                    info!(count = records.len(), "Aircraft data fetched");
                    return FetchOutcome::Records(records);
                }
                Ok(None) => {
                    debug!("Decoder returned no aircraft data");
                    return FetchOutcome::NoData;
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Fetch attempt failed"
                    );
                }
            }

            if attempt < self.max_attempts && !shutdown.sleep(self.backoff).await {
                debug!("Shutdown requested during fetch backoff");
                break;
            }
        }

        warn!("Failed to fetch aircraft data after retries");
        FetchOutcome::Exhausted
    }

    /// 1回分のGETとパース
    ///
    /// `Ok(Some(_))` = 有効データ、`Ok(None)` = データ無し（終端）、
    /// `Err(_)` = リトライ対象の失敗。
    async fn try_fetch(&self) -> FeederResult<Option<Vec<RawAircraft>>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeederError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeederError::Http(format!("HTTP {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FeederError::Http(format!("Invalid JSON body: {e}")))?;

        match body {
            serde_json::Value::Array(items) if !items.is_empty() => {
                // 配列内の非オブジェクト要素はデータ品質の問題として黙って捨てる
                let records: Vec<RawAircraft> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect();
                if records.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(records))
                }
            }
            _ => Ok(None),
        }
    }
}
