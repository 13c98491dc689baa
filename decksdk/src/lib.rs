//! Minimal Stream Deck plugin SDK
//!
//! Covers what a plugin that only displays images needs:
//!
//! - parsing the launch arguments ([`RegistrationParams`])
//! - connecting and registering over the local WebSocket ([`StreamDeck`])
//! - decoding inbound events ([`ReceivedEvent`]) and dispatching them to an
//!   [`EventHandler`]
//! - sending `setImage` commands ([`StreamDeckHandle`])

pub mod args;
pub mod client;
pub mod commands;
pub mod error;
pub mod events;

pub use args::{RegistrationInfo, RegistrationParams};
pub use client::{EventHandler, StreamDeck, StreamDeckHandle};
pub use commands::{SetImage, Target};
pub use error::{Error, Result};
pub use events::{EventKind, ReceivedEvent};
