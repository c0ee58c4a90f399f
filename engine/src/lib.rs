//! Frisky Goal Engine Library
//!
//! Streak, celebration and mood decisions for the Frisky companion app,
//! wired to goal storage and a metric snapshot provider.

pub mod config;
pub mod db;
pub mod error;
pub mod providers;
pub mod repositories;
pub mod services;
pub mod state;
