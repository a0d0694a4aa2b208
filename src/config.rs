//! Configuration management via environment variables
//!
//! All tunables are read from `SKYFEED_*` environment variables with
//! sensible defaults. CLI flags (see `main.rs`) override the URLs and paths.

use std::path::PathBuf;
use std::time::Duration;

/// Get an environment variable, or a default if unset
pub fn get_env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed to a specific type
///
/// Returns the default if the variable is unset or fails to parse.
/// A parse failure logs a warning rather than aborting startup.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Environment variable '{}' has unparseable value '{}', using default",
                name,
                raw
            );
            default
        }),
        Err(_) => default,
    }
}

/// フィーダー全体の設定
///
/// ポーリング周期は各試行のタイムアウト・バックオフ合計より長くすること。
/// サイクルが重ならないための運用上の前提であり、コードでは強制しない。
#[derive(Debug, Clone)]
pub struct FeederConfig {
    /// デコーダーのローカルHTTPエンドポイント
    pub decoder_url: String,
    /// コレクターのリモートHTTPエンドポイント
    pub collector_url: String,
    /// デコーダー実行ファイルのパス
    pub decoder_bin: PathBuf,
    /// デコーダーの起動引数
    pub decoder_args: Vec<String>,
    /// デコーダーの作業ディレクトリ
    pub decoder_dir: PathBuf,
    /// ログ出力ディレクトリ（フィーダー自身とデコーダーのstdout/stderr）
    pub log_dir: PathBuf,
    /// フェッチの試行ごとのタイムアウト
    pub fetch_timeout: Duration,
    /// フェッチの最大試行回数
    pub fetch_attempts: u32,
    /// 送信の試行ごとのタイムアウト
    pub send_timeout: Duration,
    /// 送信の最大試行回数
    pub send_attempts: u32,
    /// リトライ間の固定バックオフ
    pub backoff: Duration,
    /// ポーリング周期
    pub poll_interval: Duration,
    /// デコーダー(再)起動後の安定待ち時間
    pub settle_delay: Duration,
    /// graceful停止を待つ時間（超過で強制kill）
    pub stop_timeout: Duration,
}

impl FeederConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            decoder_url: get_env_or("SKYFEED_DECODER_URL", "http://127.0.0.1:8080/data.json"),
            collector_url: get_env_or(
                "SKYFEED_COLLECTOR_URL",
                "http://127.0.0.1:5000/api/aircraft",
            ),
            decoder_bin: PathBuf::from(get_env_or("SKYFEED_DECODER_BIN", "./dump1090")),
            decoder_args: parse_args(&get_env_or("SKYFEED_DECODER_ARGS", "--net")),
            decoder_dir: PathBuf::from(get_env_or("SKYFEED_DECODER_DIR", ".")),
            log_dir: PathBuf::from(get_env_or("SKYFEED_LOG_DIR", "./logs")),
            fetch_timeout: Duration::from_secs(get_env_parse("SKYFEED_FETCH_TIMEOUT_SECS", 5u64)),
            fetch_attempts: get_env_parse("SKYFEED_FETCH_ATTEMPTS", 3u32),
            send_timeout: Duration::from_secs(get_env_parse("SKYFEED_SEND_TIMEOUT_SECS", 5u64)),
            send_attempts: get_env_parse("SKYFEED_SEND_ATTEMPTS", 3u32),
            backoff: Duration::from_secs(get_env_parse("SKYFEED_BACKOFF_SECS", 2u64)),
            poll_interval: Duration::from_secs(get_env_parse("SKYFEED_POLL_INTERVAL_SECS", 15u64)),
            settle_delay: Duration::from_secs(get_env_parse("SKYFEED_SETTLE_SECS", 5u64)),
            stop_timeout: Duration::from_secs(get_env_parse("SKYFEED_STOP_TIMEOUT_SECS", 5u64)),
        }
    }
}

/// 空白区切りの引数文字列を分割する
fn parse_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(|s| s.to_string()).collect()
}
