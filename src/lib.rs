//! outreach-planner
//!
//! Weekly visit planning for outreach: region classification against a fixed
//! location schedule, per-day clustering, and route ordering with road or
//! straight-line distance estimates.

pub mod cluster;
pub mod config;
pub mod error;
pub mod estimator;
pub mod geocode;
pub mod haversine;
pub mod models;
pub mod osrm;
pub mod outreach;
pub mod polyline;
pub mod region;
pub mod route;
pub mod schedule;
pub mod store;
pub mod traits;
