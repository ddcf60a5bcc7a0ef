//! Shared constants for test infrastructure

pub const OWNER: &str = "acme";
pub const REPO: &str = "tool";
pub const TOKEN_ENV: &str = "ACME_TEST_TOKEN";
pub const TOKEN: &str = "ghp_test_token";

pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_1_0: &str = "1.1.0";
pub const VERSION_0_9_0: &str = "0.9.0";

pub const ASSET_LINUX: &str = "tool_linux_amd64";
pub const ASSET_DARWIN: &str = "tool_darwin_arm64";
pub const ASSET_WINDOWS: &str = "tool_windows_amd64.exe";
pub const ASSET_CHECKSUMS: &str = "checksums.txt";

pub const OLD_BINARY_CONTENT: &[u8] = b"#!/bin/sh\necho old version\n";
pub const NEW_BINARY_CONTENT: &[u8] = b"#!/bin/sh\necho new version\n";

/// Asset name carrying the identifier of the OS running the tests
pub fn host_asset_name() -> String {
    format!("{}_{}_amd64", REPO, inplace_update::host_os_identifier())
}

/// An OS identifier that never matches the host
pub fn foreign_os() -> &'static str {
    if inplace_update::host_os_identifier() == "plan9" {
        "haiku"
    } else {
        "plan9"
    }
}
