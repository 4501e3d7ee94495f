//! App - アプリケーション層
//!
//! domain / queue / scheduler / executor を組み合わせて Engine を作る。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: Engine の構築とワイヤリング（起動時検証つき）
//! - **Engine**: submit / query_status / run_pass / start_ticker
//! - **TaskStatusView**: ステータスクエリの返り値

pub mod builder;
pub mod engine;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, EngineBuilder};
pub use self::engine::Engine;
pub use self::status::TaskStatusView;
