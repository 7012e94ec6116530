//! Mirror a source directory tree onto a destination tree.
//!
//! The [`sync::SyncEngine`] runs the individual tree walks (structure,
//! prune, copy, recursive delete); [`cli`] and [`config`] describe how the
//! `dirsync` binary drives them.

pub mod cli;
pub mod config;
pub mod error;
pub mod fs_util;
pub mod sync;
