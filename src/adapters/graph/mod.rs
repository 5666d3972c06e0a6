//! Microsoft Graph adapter: token acquisition, HTTP gateway and a recording double.

pub mod auth;
pub mod client;
pub mod odata;
pub mod recording;

pub use auth::{ClientCredentialsProvider, StaticTokenProvider};
pub use client::GraphClient;
pub use recording::{RecordedCall, RecordingGraph};
