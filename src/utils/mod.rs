//! Utility modules shared by the completion layer.
//!
//! - [`build_client`]: reqwest client with the crate's user agent
//! - [`RetryConfig`]: fixed-delay retry policy with a per-attempt timeout
//! - [`with_retry`]: run an operation under a [`RetryConfig`]
//!
//! # Retry
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use mystery_scout::completion::CompletionError;
//! use mystery_scout::utils::{with_retry, RetryConfig, RetryResult};
//!
//! # async fn fetch() -> Result<String, CompletionError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() {
//! let config = RetryConfig::default().delay(Duration::from_millis(500));
//! match with_retry(config, |_attempt| fetch()).await {
//!     RetryResult::Success(text) => println!("{text}"),
//!     _ => eprintln!("gave up"),
//! }
//! # }
//! ```

mod http;
mod retry;

pub use http::{build_client, USER_AGENT};
pub use retry::{with_retry, RetryConfig, RetryResult};
