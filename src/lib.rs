#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod deliverables;
pub mod draft_sync;
pub mod error;
pub mod event_view;
pub mod models;
pub mod phase;
pub mod session;
pub mod submission_flow;
pub mod team_flow;
pub mod utils;
pub mod window_watcher;
