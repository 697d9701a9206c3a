//! Pipeline stages for order document composition.
//!
//! Each submodule implements exactly one step. Only [`input`] does I/O; the
//! rest are synchronous functions over the payload and a
//! [`crate::document::DocumentSink`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ instructions ──▶ plan ──▶ pages
//! (path/URL)  (page 1)        (PageSpecs) (pages 2..)
//!                   ╲                   ╱
//!                    ╰──── format ─────╯
//! ```
//!
//! 1. [`input`]: read and parse the payload from a path, stdin or URL
//! 2. [`instructions`]: the fixed first page and the raw payload dump
//! 3. [`plan`]: decide the dynamic pages from `buildConfig`
//! 4. [`pages`]: draw one planned page with header and footer
//! 5. [`format`]: turn payload values into display strings

pub mod format;
pub mod input;
pub mod instructions;
pub mod pages;
pub mod plan;
