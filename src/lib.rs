//! Prescription, logging and progress tracking for a fixed 52-week hybrid
//! strength and endurance program.

pub mod cli;
pub mod collab;
pub mod commands;
pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod models;
pub mod progress;
pub mod program;
pub mod store;
pub mod types;
pub mod workout;
