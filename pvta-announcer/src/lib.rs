//! PVTA departure announcer.
//!
//! Polls the PVTA InfoPoint departures feed for a configured set of stops,
//! detects trips whose countdown just crossed the announcement threshold,
//! and reads each one out over audio.

pub mod announce;
pub mod config;
pub mod detect;
pub mod domain;
pub mod infopoint;
pub mod run;
pub mod store;
