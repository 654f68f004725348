//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate orb, critter and history components into the public
//!   session API used by presentation hosts.
//! - Keep hosts decoupled from rule and storage details.

pub mod session_service;
