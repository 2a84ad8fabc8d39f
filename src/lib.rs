//! petfriends-harness: HTTP client and scenario suite for the PetFriends pet management API.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
