//! Configuration loading for payroll formula sets.
//!
//! This module provides functionality to load formula sets from YAML files
//! and to validate them before they are used in a payroll run.
//!
//! # Example
//!
//! ```no_run
//! use payroll_formula::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/standard").unwrap();
//! println!("Loaded formula set: {}", loader.formula_set().name());
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, FORMULAS_FILE};
pub use types::{FormulaSet, FormulaSetConfig};
