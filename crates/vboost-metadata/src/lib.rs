//! Video metadata persistence and principal resolution.
//!
//! This crate provides:
//! - The `MetadataStore` trait used by upload and status lookup
//! - A PostgREST client and store (Supabase's REST layer)
//! - An in-memory store for development and tests
//! - The `PrincipalResolver` trait with Supabase and anonymous implementations

pub mod auth;
pub mod client;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;

pub use auth::{AnonymousPrincipals, Principal, PrincipalResolver, SupabaseAuth};
pub use client::{PostgrestClient, PostgrestConfig};
pub use error::{MetadataError, MetadataResult};
pub use memory::MemoryMetadataStore;
pub use store::{MetadataStore, PostgrestMetadataStore, PROCESSED_VIDEOS_TABLE, VIDEOS_TABLE};
