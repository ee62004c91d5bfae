//! Payroll formula evaluation engine.
//!
//! This crate parses and evaluates arithmetic formulas over named decimal
//! payroll variables to compute salary components such as allowances,
//! deductions and overtime, and runs prioritized formula sets where each
//! result is available to later formulas.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod formula;
pub mod models;
