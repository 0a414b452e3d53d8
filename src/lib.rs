//! Weekly timetable optimizer for a multi-location fitness studio chain.
//!
//! Turns historic class records into next week's timetable: aggregates
//! per-slot performance, enforces the studio's hard business rules, and
//! fills the week through a sequence of greedy phases. A recommendation
//! layer ranks (format, instructor) candidates for individual slots, with
//! an optional external recommender behind a local fallback.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `HistoricClassRecord`, `Instructor`,
//!   `ClassAssignment`, `WeeklySchedule`, days/times/shifts
//! - **`config`**: Tunables, business lists, and the curated seed classes
//! - **`rules`**: Hard constraint predicates (formats, times, tiers, capacity)
//! - **`stats`**: Performance aggregation and top-performer selection
//! - **`tracker`**: Per-run instructor load accounting
//! - **`scheduler`**: The multi-phase optimizer and the manual-edit surface
//! - **`recommend`**: Slot recommendations with provider fallback
//! - **`validation`**: Input integrity checks (duplicate roster keys, bad figures)
//!
//! # Quick start
//!
//! ```
//! use studio_schedule::config::ScheduleConfig;
//! use studio_schedule::models::Instructor;
//! use studio_schedule::scheduler::{OptimizerOptions, ScheduleOptimizer};
//!
//! let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
//! let roster = vec![Instructor::new("Anita", "Rao")];
//! let schedule = optimizer.generate(&[], &roster, &OptimizerOptions::new());
//! assert!(schedule.assignments.iter().all(|a| a.is_locked || !a.is_private));
//! ```

pub mod config;
pub mod models;
pub mod recommend;
pub mod rules;
pub mod scheduler;
pub mod stats;
pub mod tracker;
pub mod validation;
