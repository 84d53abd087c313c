//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Ledger commands (init, accounts, categories) and shared utilities
//! - `import` - CSV import (validation, dry run, apply)
//! - `analyze` - Period statistics and AI analysis

pub mod analyze;
pub mod core;
pub mod import;

// Re-export command functions for main.rs
pub use analyze::*;
pub use self::core::*;
pub use import::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with two decimals
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
