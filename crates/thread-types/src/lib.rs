//! # thread-types
//!
//! Shared data model for the story-threads engine.
//!
//! A *thread* is a cluster of related posts about the same evolving story.
//! This crate defines the thread and update records, the ingestion-boundary
//! post shape, the tunable configuration tree, and the unified error type.
//! It contains no engine logic; see `thread-engine` for matching and
//! lifecycle behavior.

pub mod config;
pub mod error;
pub mod post;
pub mod thread;

pub use config::{
    ArchivalConfig, DetectionConfig, ThreadConfigPatch, ThreadManagementConfig, UpdatePolicyConfig,
};
pub use error::ThreadError;
pub use post::{IncomingPost, PostSnapshot};
pub use thread::{StoryThread, StoryUpdate, ThreadStatus, UpdateChanges, UpdateType};
