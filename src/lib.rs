//! Glint library crate
//!
//! Core of the Glint command-palette launcher: the window
//! visibility/animation state machine and the keyboard-focus guard behind
//! the overlay, plus the settings and chat collaborators around them. The
//! actual windowing toolkit stays behind the `WindowPort` trait so the whole
//! core runs headless in tests and in the demo harness.

pub mod animation;
pub mod bridge;
pub mod chat;
pub mod error;
pub mod focus;
pub mod port;
pub mod settings;
pub mod visibility;
