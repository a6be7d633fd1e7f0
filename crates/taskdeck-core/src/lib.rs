//! # taskdeck-core
//!
//! Core types, traits, and abstractions for taskdeck.
//!
//! This crate provides the domain models, status tables, validators and
//! repository traits that the database and api crates build on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod status;
pub mod traits;
pub mod uuid_utils;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, ServerEvent};
pub use models::*;
pub use status::{BadgeVariant, StatusConfig, StatusConfigItem, StatusEnum, StatusOption};
pub use traits::*;
pub use uuid_utils::{new_v7, parse_id};
pub use validation::{AttachmentInput, Description, Tags, Title};
