//! Core library for the talent-grid platform: competency-framework
//! administration and seniority assessments for sales teams.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
