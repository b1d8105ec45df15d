pub mod client;

pub use client::{BlueskyClient, ClientConfig, DEFAULT_SERVICE};
