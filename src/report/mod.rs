//! Terminal rendering of snapshots and change trees
//!
//! - [`render_folder_change`]: one level of a change tree as a colored table
//! - [`render_change_levels`]: those tables for every differing folder down to a depth
//! - [`render_snapshot`]: a snapshot as an indented tree
//! - [`Navigator`]: line-driven browsing of a change tree

mod navigate;
mod table;
mod tree;

pub use navigate::Navigator;
pub use table::{render_change_levels, render_folder_change};
pub use tree::render_snapshot;
