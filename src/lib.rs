//! City table TUI built on tui-dispatch
//!
//! This library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod collate;
pub mod components;
pub mod effect;
pub mod logging;
pub mod reducer;
pub mod state;
