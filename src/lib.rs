//! Items with image and video attachments.
//!
//! The server side ([`features::items`], [`modules::media`]) stores media
//! through a pluggable provider. The [`client`] module holds the upload
//! transport, cache invalidation and drop-zone state used by front ends.

pub mod app;
pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
