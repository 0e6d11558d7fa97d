//! Air quality readings for a set of cities, rendered as a severity-coloured
//! status-bar menu.

pub mod breakpoints;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod models;
pub mod report;
pub mod service;
pub mod severity;
