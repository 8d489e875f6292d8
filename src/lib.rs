//! Performance charts for the deployment docs and for A/B load test comparisons

pub mod chart;
pub mod cli;
pub mod compare;
pub mod deployment;
pub mod k6;
pub mod render;
