//! Terminal UI layer for the ground-station console.
//!
//! Provides themes, the page shell with its sidebar, the connection
//! indicator, the live dashboard cards, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod pages;
pub mod themes;

pub use console_core as core;
