//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **ReqwestTransport**: reqwest による Transport

pub mod reqwest_transport;

pub use self::reqwest_transport::ReqwestTransport;
