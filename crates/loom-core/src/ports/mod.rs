//! Ports - 抽象化レイヤー
//!
//! 外部（時刻・ネットワーク）への依存を trait で切り出す。
//! 実装は `impls` に置く。

pub mod clock;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::transport::{HttpCall, HttpMethod, HttpResponse, Transport};
