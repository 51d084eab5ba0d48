//! Check Conan dependencies for newer versions in the configured remotes.
//!
//! The crate is split into three layers:
//!
//! - [`conan`]: everything that touches the external `conan` executable:
//!   locating it, invoking it asynchronously, and parsing its
//!   version-dependent output into structured records
//! - [`version`]: parsing and ordering of Conan version strings
//! - [`checker`]: the composition that resolves a manifest's requirements
//!   and searches the remotes for newer versions
//!
//! The binary in `src/main.rs` is a thin CLI over [`checker::check_updates`].

pub mod checker;
pub mod conan;
pub mod config;
pub mod version;
