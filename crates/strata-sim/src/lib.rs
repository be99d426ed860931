//! Command line harness around the stratified allocation engine.

pub mod cohort;
pub mod commands;
