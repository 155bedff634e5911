//! FreakDraw: a layered raster painting engine with undo history, a tool
//! state machine and a headless replay mode.

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod error;
pub mod input;
pub mod io;
pub mod logger;
pub mod ops;
pub mod session;
pub mod settings;
