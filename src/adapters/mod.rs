//! Infrastructure adapters. Implement ports.
//!
//! Graph HTTP gateway and terminal UI. Map errors to DomainError.

pub mod graph;
pub mod ui;
