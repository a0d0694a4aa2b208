//! skyfeed
//!
//! ADS-Bデコーダープロセスを監視し、航空機レポートをコレクターへ中継するフィーダー

#![warn(missing_docs)]

/// エラー型定義
pub mod error;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// デコーダープロセス管理（起動・監視・再起動）
pub mod supervisor;

/// デコーダーエンドポイントからのデータ取得
pub mod fetcher;

/// 生レコードの検証・正規化
pub mod normalizer;

/// コレクターへの送信
pub mod uplink;

/// ポーリングループ（状態機械）
pub mod runner;

/// Shutdown controller (cooperative cancellation)
pub mod shutdown;

/// 型定義
pub mod types;
