// src/lib.rs
#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod file;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod resolve;
pub mod scheduler;
pub mod serve;
pub mod snapshot;
pub mod store;

pub use board::{BoardCell, Leaderboard, LeaderboardRow};
pub use config::AppOptions;
pub use pipeline::{CycleReport, Pipeline};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerState};
