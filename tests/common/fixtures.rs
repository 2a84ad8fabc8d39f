//! Photos and accounts used across integration tests.
#![allow(dead_code)]

use petfriends_harness::adapters::http::{ClientConfig, PetFriendsClient};
use petfriends_harness::domain::pet::Credentials;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const EMAIL: &str = "tester@example.com";
pub const PASSWORD: &str = "s3cret";

/// Smallest byte sequence with JPEG start and end markers.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

pub fn credentials() -> Credentials {
    Credentials::new(EMAIL, PASSWORD)
}

/// A JPEG file in a fresh temp dir; keep the dir alive while the path is used.
pub fn jpeg_photo() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("cat.jpg");
    std::fs::write(&path, JPEG_BYTES).expect("write photo");
    (dir, path)
}

pub fn client(base_url: &str) -> PetFriendsClient {
    let mut config = ClientConfig::new(base_url);
    config.timeout = Some(Duration::from_secs(10));
    PetFriendsClient::new(config).expect("build client")
}
