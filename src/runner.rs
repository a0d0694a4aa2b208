//! ポーリングループ（状態機械）
//!
//! Initializing → Polling → ShuttingDown の3状態。各サイクルは
//! 生存確認 → フェッチ → 正規化 → 送信 を順に完了させてから
//! 周期スリープに入る。サイクル同士が重なることはない。

use crate::config::FeederConfig;
use crate::error::FeederResult;
use crate::fetcher::{DataFetcher, FetchOutcome};
use crate::normalizer::normalize;
use crate::shutdown::ShutdownController;
use crate::supervisor::{DecoderSupervisor, Liveness};
use crate::uplink::UplinkSender;
use tracing::{debug, error, info, warn};

/// フィーダーループの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederState {
    /// デコーダー起動と安定待ちの最中
    Initializing,
    /// 定常ポーリング中
    Polling,
    /// シャットダウン処理中（終端状態）
    ShuttingDown,
}

/// フィーダー本体
///
/// デコーダーの監視・取得・正規化・送信を1本の論理スレッドで回す。
pub struct FeederLoop {
    config: FeederConfig,
    supervisor: DecoderSupervisor,
    fetcher: DataFetcher,
    sender: UplinkSender,
    shutdown: ShutdownController,
    state: FeederState,
}

impl FeederLoop {
    /// Build the loop from configuration. No I/O happens here.
    pub fn new(config: FeederConfig, shutdown: ShutdownController) -> FeederResult<Self> {
        let supervisor = DecoderSupervisor::new(&config);
        let fetcher = DataFetcher::new(&config)?;
        let sender = UplinkSender::new(&config)?;

        Ok(Self {
            config,
            supervisor,
            fetcher,
            sender,
            shutdown,
            state: FeederState::Initializing,
        })
    }

    /// 現在の状態を返す
    pub fn state(&self) -> FeederState {
        self.state
    }

    /// ループを実行する
    ///
    /// 初回のデコーダー起動に失敗した場合のみ`Err`を返す（致命的）。
    /// それ以外の失敗はすべてループ内で回復・破棄され、シャットダウン
    /// 要求で`Ok`のまま戻る。
    pub async fn run(mut self) -> FeederResult<()> {
        self.supervisor.start()?;
        self.settle().await;
        self.state = FeederState::Polling;
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "Feeder polling started"
        );

        while !self.shutdown.is_shutdown_requested() {
            self.cycle().await;

            if !self.shutdown.sleep(self.config.poll_interval).await {
                break;
            }
        }

        self.state = FeederState::ShuttingDown;
        info!("Shutdown requested, stopping decoder");
        self.supervisor.stop().await;
        info!("Feeder shutdown complete");
        Ok(())
    }

    /// 1サイクルだけ実行して終了する（`--once`、疎通確認用）
    pub async fn run_once(mut self) -> FeederResult<()> {
        self.supervisor.start()?;
        self.settle().await;
        self.state = FeederState::Polling;

        self.cycle().await;

        self.state = FeederState::ShuttingDown;
        self.supervisor.stop().await;
        Ok(())
    }

    /// 1サイクル: 生存確認 → フェッチ → 正規化 → 送信
    async fn cycle(&mut self) {
        if self.supervisor.liveness() != Liveness::Running {
            warn!("Decoder is not running, restarting");
            if !self.restart_decoder().await {
                return;
            }
        }

        match self.fetcher.fetch(&self.shutdown).await {
            FetchOutcome::Records(raw) => {
                let batch = normalize(raw);
                if let Err(e) = self.sender.send(&batch, &self.shutdown).await {
                    // 配送不能バッチは破棄する。ローカルに滞留させない
                    warn!(count = batch.len(), error = %e, "Batch dropped after send retries");
                }
            }
            FetchOutcome::NoData => {
                debug!("No aircraft data this cycle");
            }
            FetchOutcome::Exhausted => {
                warn!("Fetch retries exhausted, restarting decoder");
                self.restart_decoder().await;
            }
        }
    }

    /// デコーダーを再起動して安定待ちする
    ///
    /// 再起動の失敗は致命的エラーにはしない。ハンドルが空のまま次の
    /// サイクルの生存確認で再試行される。
    async fn restart_decoder(&mut self) -> bool {
        match self.supervisor.restart().await {
            Ok(()) => {
                self.settle().await;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to restart decoder, will retry next cycle");
                false
            }
        }
    }

    /// (再)起動直後の安定待ち
    async fn settle(&self) {
        debug!(
            settle_secs = self.config.settle_delay.as_secs(),
            "Waiting for decoder to settle"
        );
        self.shutdown.sleep(self.config.settle_delay).await;
    }
}
