//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the hosted media provider and object storage.

pub mod media;
