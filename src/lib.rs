//! Client-side dashboard for a thread-model benchmark service.
//!
//! Requests benchmark runs over HTTP, renders result cards, normalizes
//! legacy thread-model labels and keeps three comparison charts current.
//! Rendering goes through the [`ui::Ui`] adapter; [`ui::MemoryDom`] is the
//! in-memory document used by the binary and the tests.

pub mod api;
pub mod app;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod infobox;
pub mod labels;
pub mod logging;
pub mod model;
pub mod page;
pub mod ui;
