//! Flutter-facing bridge crate for Inbox Critters.

pub mod api;
