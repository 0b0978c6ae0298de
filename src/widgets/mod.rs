//! Blog widgets
//!
//! The controller renders small pieces of blog UI (category list, tag cloud,
//! recent posts, recent comments, archive and feed) from repository data and
//! reports the cache tags of what it rendered.

pub mod action;
pub mod archive;
pub mod controller;
pub mod request;
pub mod tag_cloud;
pub mod view;

pub use action::{WidgetAction, HTML_CONTENT_TYPE, XML_CONTENT_TYPE};
pub use archive::extract_data_from_posts;
pub use controller::{WidgetController, WidgetResponse};
pub use request::{parse_int_like, WidgetRequest};
pub use tag_cloud::compute_sizes;
pub use view::WidgetView;
