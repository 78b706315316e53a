//! Domain layer - core business logic and types.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (network, IO, etc.).

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, AuthorConfig, MediaConfig, OutputConfig};
pub use error::{AppError, Result};
pub use models::{
    Attachment, ChatMessage, ConversationPicker, ExportStats, MediaPayload, NameSource, Sender,
    SessionContext, SystemEvent,
};
