//! # mdsafe - Markdown to HTML and back
//!
//! Renders user-authored Markdown to HTML, converts HTML back to Markdown and
//! sanitizes Markdown by running it through both directions. A single set of
//! [`Capabilities`] drives both engines, so the dialect written back is the
//! dialect that is read.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = mdsafe::render("**bold**", None).unwrap();
//! assert!(html.contains("<strong>bold</strong>"));
//!
//! let markdown = mdsafe::convert_back("<strong>bold</strong>", None, None).unwrap();
//! assert_eq!(markdown, "**bold**");
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use mdsafe::{Capabilities, Markdown};
//!
//! let markdown = Markdown::with_capabilities(
//!   Capabilities::builder().tables(true).smart(true).build(),
//!   Some("https://example.com".to_string()),
//! );
//! let clean = markdown
//!   .sanitize("Hi <img src=x onerror=alert(1)>", None)
//!   .unwrap();
//! assert!(!clean.contains("onerror"));
//! ```
//!
//! Hosting applications usually load a [`Config`] with
//! [`Config::from_file`] and pass it to [`Markdown::new`], or
//! [`install`] it as the process-wide service used by the free functions.

pub mod cache;
pub mod capabilities;
pub mod convert;
pub mod error;
pub mod facade;
pub mod guard;
pub mod render;
pub mod resolver;
mod utils;

pub use mdsafe_config::Config;

pub use crate::{
  cache::{ConverterCache, EphemeralEngines},
  capabilities::{
    BaseUri,
    Capabilities,
    CapabilitiesBuilder,
    ConvertCustomizer,
    RenderCustomizer,
  },
  convert::{CodeBlockStyle, ConvertEngine, ConvertOptions, TableMode},
  error::{MarkdownError, Result},
  facade::{Markdown, convert_back, global, install, render, sanitize},
  guard::SharedRenderer,
  render::{RenderEngine, RenderFlags},
  resolver::{ResolvedConfig, resolve},
};
