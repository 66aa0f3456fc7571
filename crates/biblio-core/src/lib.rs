//! Biblio Core — shared types, traits, errors, and configuration.
//!
//! This crate provides the foundational types used across all Biblio crates.
//! It has no internal Biblio dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`identity`]: Requester identity and the identity-lookup seam
//! - [`document`]: Read-only projection of an indexed document
//! - [`page`]: Pagination request/response types
//! - [`prefs`]: Per-user document preferences and the preference store seam
//! - [`config`]: Serde-based configuration structs
//! - [`events`]: Fire-and-forget side-effect queue

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod identity;
pub mod page;
pub mod prefs;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

pub use document::{DocumentType, IndexedDocument, ReportStatus, SharingType};
pub use events::{spawn_effect_logger, EffectQueue, SideEffect};
pub use identity::{AppRole, IdentityProvider, MemoryIdentityProvider, UserAccount};
pub use page::{Page, PageRequest};
pub use prefs::{DocumentPreferences, MemoryPreferenceStore, PreferenceStore};
