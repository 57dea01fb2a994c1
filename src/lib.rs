//! Input routing and mode arbitration for a guest application hosted in a
//! compatibility shim.
//!
//! The host window layer feeds raw input into an [`InputEngine`], which
//! decides which input mode owns delivery, offers events to plugin hooks
//! and the debug overlay, then translates them for the guest.

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod ffi;
pub mod gamepad;
pub mod hooks;
pub mod host;
pub mod logging;
pub mod mode;
pub mod overlay;
pub mod replay;
pub mod translate;
pub mod util;

pub use config::{EngineConfig, Settings};
pub use engine::{Collaborators, InputEngine};
pub use error::InputError;
pub use event::GuestEvent;
pub use mode::InputMode;
