//! Core domain types for habitual

mod achievement;
mod category;
mod completion;
mod habit;
mod user;

pub use achievement::{Achievement, NewAchievement};
pub use category::{Category, CategoryColor, DEFAULT_CATEGORY_EMOJI, PASTEL_PALETTE};
pub use completion::{any_completed, CompletionToggle, HabitCompletion};
pub use habit::{Habit, HabitId, Importance, KpiType};
pub use user::{User, UserId, UserUpdate};
