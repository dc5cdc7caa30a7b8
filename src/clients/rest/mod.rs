//! The REST client handle.
//!
//! [`RestClient`] sits on top of [`HttpClient`](crate::clients::HttpClient)
//! and is the entry point for resource managers.

mod client;

pub use client::RestClient;
