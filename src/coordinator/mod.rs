/*!
 * Coordinator Module
 * Component registry, cleanup rounds, adaptive timer, and lifecycle
 */

mod builder;
pub mod config;
mod manager;
pub mod round;
pub mod stats;
mod task;

pub use builder::CoordinatorBuilder;
pub use config::{CleanupIntervals, CoordinatorConfig};
pub use manager::MemoryCoordinator;
pub use round::{select_for_round, selection_count};
pub use stats::{ComponentStats, CoordinatorStats};
pub use task::{CleanupCommand, CleanupTask};
