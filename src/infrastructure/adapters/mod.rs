//! Infrastructure Adapters

pub mod tts;

pub use tts::{FakeTtsClient, FakeTtsClientConfig, HttpTtsClient, HttpTtsClientConfig};
