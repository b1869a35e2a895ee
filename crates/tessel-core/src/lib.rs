//! # Tessel Core
//!
//! The processing shell around the editing core.
//!
//! ## Architecture Overview
//!
//! ```text
//!  input thread ──InputEvent──▶ InputQueue ──▶ Editor::run
//!                                                 │
//!                                   Dispatcher: event → [Command]
//!                                                 │
//!                 ┌───────────────────────────────┴──────────┐
//!                 │                 Editor                    │
//!                 │  ┌───────────┐ ┌────────┐ ┌────────────┐  │
//!                 │  │ Document  │ │ Config │ │ Session    │  │
//!                 │  │ buffer    │ └────────┘ │ positions  │  │
//!                 │  │ cursor    │            │ clipboard  │  │
//!                 │  │ selection │            └────────────┘  │
//!                 │  │ history   │                            │
//!                 │  └───────────┘                            │
//!                 └───────────────────────────────────────────┘
//! ```
//!
//! The loop owns all editing state. The only thing crossing threads is
//! the input queue.

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod session;

pub use command::{Command, Motion};
pub use config::{Config, ConfigError};
pub use document::Document;
pub use editor::Editor;
pub use event::{Dispatcher, InputEvent, InputQueue, InputSender, Key};
pub use session::{SessionError, SessionStore};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document has no file path")]
    NoDocumentPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] tessel_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
