//! Wind API Service Library
//!
//! Backend adapter between the wind map and the National Weather Service:
//! looks up the current wind for sample points and serves it as GeoJSON.

pub mod cache;
pub mod config;
pub mod error;
pub mod grid;
pub mod handlers;
pub mod nws;
pub mod routes;
pub mod state;
