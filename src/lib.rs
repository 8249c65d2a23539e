//! Feed Cache Library
//!
//! A client-side feed cache: remote loading, two interchangeable local
//! stores, a serial gate in front of them and the cache rules on top.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod completion;
pub mod config;
pub mod feed;
pub mod logging;

#[cfg(test)]
mod test_helpers;
