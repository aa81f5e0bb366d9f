//! 🩺 PC Health Checker
//!
//! Recognises reports produced by Windows and Linux diagnostic tools, extracts
//! the problems they reveal and turns them into per-category and global health
//! scores, with filtering, suggested fixes and a markdown export.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod output;
pub mod parsers;
pub mod remediation;
pub mod scoring;
pub mod search;
pub mod utils;
