//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config)
//! - `import` - Ledger CSV import
//! - `agent` - Single and continuous insight passes
//! - `insights` - Report display (latest, history)
//! - `transactions` - Users, transaction listing, categorization preview

pub mod agent;
pub mod core;
pub mod import;
pub mod insights;
pub mod transactions;

// Re-export command functions for main.rs
pub use agent::*;
pub use core::*;
pub use import::*;
pub use insights::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
