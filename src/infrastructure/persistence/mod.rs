//! Link store implementations.
//!
//! - [`FileLinkRepository`] - JSON file, loaded at startup and rewritten on change

pub mod file_link_repository;

pub use file_link_repository::FileLinkRepository;
