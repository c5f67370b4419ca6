//! HTTP handlers, grouped by resource.

pub mod bookmarks;
pub mod history;
pub mod manuscripts;
pub mod search;
