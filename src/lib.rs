//! habitual - habit tracking with XP, levels, streaks and badges
//!
//! Users complete habits day by day. Every completion today earns XP, the
//! daily streak is recomputed from history, and badges unlock at milestones.
//!
//! ## Layout
//!
//! - [`domain`]: users, habits, completions, achievements and categories
//! - [`gamification`]: level formula, streak walk, badge rules and the engine
//! - [`store`]: persistence traits with SQLite and in-memory backends
//! - [`cache`]: client-side snapshot of one user's day
//! - [`config`]: `~/.habitual/config.toml`

pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod gamification;
pub mod store;

pub use domain::*;
