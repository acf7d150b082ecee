//! Client for a local page-analysis service: sends a URL, normalizes the
//! returned metadata and turns it into displayable UI state.

pub mod affordance;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod field;
pub mod identifier;
pub mod notify;
pub mod payload;
pub mod render;
pub mod terminal;
pub mod view;
