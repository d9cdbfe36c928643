//! Tiler: a grid-based image arranging tool.
//!
//! Images are imported into a bank of thumbnails, dragged onto a pannable
//! and zoomable grid one cell at a time, moved around, dragged back, and
//! saved to a JSON project file.
//!
//! The library half holds all of the state and rules — [`board::BoardState`]
//! is the single entry point the UI talks to — so the interesting behavior
//! is testable without a window.

#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod bank;
pub mod board;
pub mod components;
pub mod drag;
pub mod grid;
pub mod io;
pub mod logger;
pub mod project;
pub mod selection;
pub mod viewport;
