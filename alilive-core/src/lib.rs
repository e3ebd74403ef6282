//! Signed push and play URLs for Aliyun-style live streaming
//!
//! ```rust,ignore
//! use alilive_core::service::{shanghai_expiry, LiveSigner};
//!
//! let signer = LiveSigner::builder()
//!     .app_name("live")
//!     .push_key("pushkey")
//!     .play_key("playkey")
//!     .push_domain("push.example.com")
//!     .play_domain("pull.example.com")
//!     .machine_ip("10.0.0.12")
//!     .build()?;
//!
//! let stream = signer.next_stream_name().unwrap_or_else(|| "room-1".to_string());
//! let expiry = shanghai_expiry(3600);
//! let push = signer.push_url(&stream, expiry);
//! let hls = signer.m3u8_play_url(&stream, expiry);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;

pub use crate::config::Config;
pub use error::{Error, Result};
pub use models::{AuthKey, LiveUrls, UrlKind};
pub use service::{LiveSigner, LiveSignerBuilder};
