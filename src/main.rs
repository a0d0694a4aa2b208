//! skyfeed Entry Point

use clap::Parser;
use skyfeed::config::FeederConfig;
use skyfeed::runner::FeederLoop;
use skyfeed::shutdown::ShutdownController;
use skyfeed::logging;
use std::path::PathBuf;
use tracing::{error, info};

/// ADS-Bデコーダーを監視し、航空機レポートをコレクターへ中継する
#[derive(Parser, Debug)]
#[command(name = "skyfeed", version, about)]
struct Cli {
    /// デコーダーのローカルエンドポイントURL
    #[arg(long, env = "SKYFEED_DECODER_URL")]
    decoder_url: Option<String>,

    /// コレクターのリモートエンドポイントURL
    #[arg(long, env = "SKYFEED_COLLECTOR_URL")]
    collector_url: Option<String>,

    /// デコーダー実行ファイルのパス
    #[arg(long, env = "SKYFEED_DECODER_BIN")]
    decoder_bin: Option<PathBuf>,

    /// ログ出力ディレクトリ
    #[arg(long, env = "SKYFEED_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// 1サイクルだけ実行して終了する（疎通確認用）
    #[arg(long)]
    once: bool,
}

impl Cli {
    /// 環境変数由来の設定にCLIフラグを上書きする
    fn apply(&self, config: &mut FeederConfig) {
        if let Some(url) = &self.decoder_url {
            config.decoder_url = url.clone();
        }
        if let Some(url) = &self.collector_url {
            config.collector_url = url.clone();
        }
        if let Some(bin) = &self.decoder_bin {
            config.decoder_bin = bin.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = FeederConfig::from_env();
    cli.apply(&mut config);

    let _log_guard = match logging::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    info!(
        decoder_url = %config.decoder_url,
        collector_url = %config.collector_url,
        "skyfeed starting"
    );

    let shutdown = ShutdownController::default();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let feeder = match FeederLoop::new(config, shutdown) {
        Ok(feeder) => feeder,
        Err(e) => {
            error!("Failed to initialize feeder: {e}");
            std::process::exit(1);
        }
    };

    let result = if cli.once {
        feeder.run_once().await
    } else {
        feeder.run().await
    };

    if let Err(e) = result {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// シャットダウンシグナルを待機
async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown.request_shutdown();
}
