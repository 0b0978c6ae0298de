//! Blog widgets - sidebar widgets for a blog with tag-based page caching
//!
//! This library provides the widget controller and the service around it.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod theme;
pub mod widgets;
