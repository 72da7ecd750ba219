//! Request and Response models for the storefront API
//!
//! This module defines the DTOs used for HTTP query strings and the
//! diagnostic response bodies. Domain records serialize themselves.

pub mod requests;
pub mod responses;

pub use requests::{PageQuery, QuantityQuery};
pub use responses::{
    CacheStatsResponse, ErrorResponse, HealthResponse, ImageResponse, StatsResponse,
};
