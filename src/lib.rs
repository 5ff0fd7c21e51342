//! Parallel array summation over forked processes and queued real-time
//! signals.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── parent ─────────────────────────────┐
//!   │                                                                  │
//!   │  config ──▶ coordination::Controller ──fork──▶ worker 0..P-2     │
//!   │                  │        ▲                        │             │
//!   │                  │        │ poll                   │ sigqueue    │
//!   │                  │   aggregate::Tally ◀── handler ◀┘ (SIGRTMIN+k)│
//!   │                  ▼                                               │
//!   │       reap workers, add own partition ──▶ Report                 │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod config;
pub mod coordination;
pub mod error;
pub mod observability;
pub mod sys;
pub mod work;

pub use config::schema::SumConfig;
pub use coordination::{Controller, Report};
pub use error::SumError;
