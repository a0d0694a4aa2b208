//! デコーダープロセス管理（起動・監視・再起動）
//!
//! 外部デコーダー（dump1090系）の不安定さをこのモジュール内に閉じ込める。
//! 上位のループは「生きているか」「再起動しろ」だけを問い合わせる。

use crate::config::FeederConfig;
use crate::error::{FeederError, FeederResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// 監視対象プロセスの生存状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// 実行中
    Running,
    /// 正常終了していた
    ExitedCleanly,
    /// 異常終了していた（またはハンドルが無い）
    ExitedWithError,
}

/// デコーダープロセスのスーパーバイザー
///
/// 子プロセスのハンドルを唯一所有する。同時に保持するハンドルは
/// 常に最大1つで、新規起動の前に古いハンドルは必ず破棄される。
pub struct DecoderSupervisor {
    bin: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
    log_dir: PathBuf,
    stop_timeout: Duration,
    child: Option<Child>,
}

impl DecoderSupervisor {
    /// Create a supervisor from the feeder configuration. Nothing is
    /// launched until [`start`](Self::start) is called.
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            bin: config.decoder_bin.clone(),
            args: config.decoder_args.clone(),
            work_dir: config.decoder_dir.clone(),
            log_dir: config.log_dir.clone(),
            stop_timeout: config.stop_timeout,
            child: None,
        }
    }

    /// デコーダーを起動する
    ///
    /// stdout/stderrはログディレクトリ内のファイルへ追記リダイレクトする。
    /// パイプにすると誰も読まずに子プロセスがブロックするため不可。
    /// 起動失敗は致命的エラーとして呼び出し元へ返す。
    pub fn start(&mut self) -> FeederResult<()> {
        // 万一残っていた古いハンドルは待たずに破棄する
        if let Some(mut stale) = self.child.take() {
            warn!("Stale decoder handle found, discarding");
            let _ = stale.start_kill();
        }

        std::fs::create_dir_all(&self.log_dir)?;
        let stdout_log = open_log(&self.log_dir.join("decoder.stdout.log"))?;
        let stderr_log = open_log(&self.log_dir.join("decoder.stderr.log"))?;

        info!(bin = %self.bin.display(), args = ?self.args, "Starting decoder");

        let child = Command::new(&self.bin)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_log))
            .stderr(Stdio::from(stderr_log))
            .kill_on_drop(true)
            .spawn()?;

        info!(pid = ?child.id(), "Decoder started");
        self.child = Some(child);
        Ok(())
    }

    /// 生存確認（ノンブロッキング）
    ///
    /// 終了を検出した場合はハンドルを破棄し、終了コードに応じた状態を返す。
    pub fn liveness(&mut self) -> Liveness {
        let Some(child) = self.child.as_mut() else {
            return Liveness::ExitedWithError;
        };

        match child.try_wait() {
            Ok(None) => Liveness::Running,
            Ok(Some(status)) => {
                self.child = None;
                if status.success() {
                    info!("Decoder exited cleanly");
                    Liveness::ExitedCleanly
                } else {
                    warn!(%status, "Decoder exited with error");
                    Liveness::ExitedWithError
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to query decoder status");
                self.child = None;
                Liveness::ExitedWithError
            }
        }
    }

    /// 現在のプロセスを停止してから再起動する
    pub async fn restart(&mut self) -> FeederResult<()> {
        info!("Restarting decoder");
        self.stop().await;
        self.start()
    }

    /// デコーダーを停止する（冪等）
    ///
    /// まずgracefulな終了を要求し、`stop_timeout`以内に終了しなければ
    /// 強制killする。終了を確認するまで戻らない。
    pub async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        terminate_gracefully(&child);

        match tokio::time::timeout(self.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => info!(%status, "Decoder terminated"),
            Ok(Err(e)) => warn!(error = %e, "Failed to wait for decoder exit"),
            Err(_) => {
                warn!(
                    timeout_secs = self.stop_timeout.as_secs(),
                    "Decoder did not terminate in time, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill decoder");
                }
            }
        }
    }
}

/// graceful終了を要求する（Unix: SIGTERM、その他: 即kill要求）
#[cfg(unix)]
fn terminate_gracefully(child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(pid, error = %e, "Failed to send SIGTERM to decoder");
        }
    }
}

#[cfg(not(unix))]
fn terminate_gracefully(child: &Child) {
    // SIGTERM相当が無いため、wait側のタイムアウト経由でkillに任せる
    let _ = child;
}

fn open_log(path: &std::path::Path) -> FeederResult<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(FeederError::Spawn)
}
