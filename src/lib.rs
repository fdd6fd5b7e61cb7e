//! dualcam library crate.
//!
//! Session state machine, frame compositing and capture for a two-camera
//! preview, plus the terminal and CLI shells the binary is built from.

pub mod camera;
pub mod capture;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod input;
pub mod options;
pub mod session;
pub mod signal;
pub mod state;
pub mod terminal;
