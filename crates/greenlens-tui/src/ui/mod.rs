//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, loading screen, status bar and overlays
//! - `input`: keyboard event handling per screen
//! - `styles`: color scheme and text styling
//! - `screens`: one renderer per navigable screen

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
