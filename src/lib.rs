//! Container load planning.
//!
//! Aggregates a list of cargo items, suggests the smallest shipping
//! container (or number of containers) that holds them, and computes grid
//! placements for single-shape loads.

pub mod aggregate;
pub mod api;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod fit;
pub mod model;
pub mod placement;
pub mod selector;
pub mod types;
