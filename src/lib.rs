//! Client library for the curated-search console: credentials, request
//! signing, the content-graph REST client and response normalization.

pub mod auth;
pub mod bestbets;
pub mod collections;
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod normalize;
pub mod pinned;
pub mod storage;

pub use error::ApiError;
