//! Terminal UI for the Uliza client.
//!
//! - `render`: draws the three-pane layout and overlays
//! - `input`: translates keyboard events into application state changes
//! - `styles`: shared color palette and style helpers

pub mod input;
pub mod render;
pub mod styles;
