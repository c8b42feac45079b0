//! Core library modules.
//!
//! The reading clock ([`timer`]), screen snapshots ([`screen`]) and session
//! aggregation ([`session`]) are wired together by [`tracker`]. They depend
//! only on the [`store::KeyValueStore`], [`clock::Clock`],
//! [`ticker::Ticker`] and [`library::Library`] seams, which the `db` module
//! and the CLI fill in.

pub mod book;
pub mod clock;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod formatter;
pub mod library;
pub mod messages;
pub mod screen;
pub mod session;
pub mod stats;
pub mod store;
pub mod ticker;
pub mod timer;
pub mod tracker;
pub mod view;
