//! Cost optimizer server: configuration and the read API

pub mod api;
pub mod config;
