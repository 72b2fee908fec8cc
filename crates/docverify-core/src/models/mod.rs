//! Data models shared across the verification pipeline.

pub mod config;
pub mod field;
pub mod fragment;
pub mod verification;
