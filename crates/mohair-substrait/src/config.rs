//! # Library Configuration
//!
//! Build-level settings are carried in an immutable [`LibraryConfig`] value that
//! the embedding program creates once at startup and passes to whatever needs it.
//! There is no global state.

use std::fmt;

/// Semantic version of this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl LibraryVersion {
    /// The version this crate was compiled as.
    pub fn from_build() -> Self {
        Self {
            major: parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
            minor: parse_component(env!("CARGO_PKG_VERSION_MINOR")),
            patch: parse_component(env!("CARGO_PKG_VERSION_PATCH")),
        }
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// cargo always sets these to decimal integers
fn parse_component(component: &str) -> u32 {
    component.parse().unwrap_or(0)
}

/// Library settings shared by the tools built on this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub version: LibraryVersion,
}

impl LibraryConfig {
    pub fn from_build() -> Self {
        Self {
            version: LibraryVersion::from_build(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::from_build()
    }
}
