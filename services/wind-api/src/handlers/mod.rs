//! HTTP request handlers for the Wind API.

pub mod health;
pub mod legend;
pub mod wind;
