//! The library code for `blogomatic`, which turns a month's worth of article
//! metadata and a contributor registry into one static HTML blog post. A run
//! is a single pass through four steps:
//!
//! 1. Loading the articles from YAML or CSV ([`crate::source`]), with the
//!    Markdown fields converted to HTML fragments ([`crate::markdown`])
//! 2. Reconciling every article's contributor against the registry
//!    ([`crate::reconcile`]), interactively creating or updating profiles and
//!    writing the registry back ([`crate::contributor`])
//! 3. Rendering the template with the articles, the post's author and the
//!    standard content ([`crate::render`])
//! 4. Rewriting anchors in the result ([`crate::anchors`])
//!
//! [`crate::build::build_post`] runs all of them.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod anchors;
pub mod article;
pub mod build;
pub mod config;
pub mod contributor;
pub mod logging;
pub mod markdown;
pub mod prompt;
pub mod reconcile;
pub mod render;
pub mod source;
pub mod util;
pub mod value;
