// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # cspgen - Content-Security-Policy Generator
//!
//! Crawls a single web page, observes every resource it loads during one
//! render pass, and synthesizes a CSP header from the observations.
//!
//! ## How it works
//!
//! - A page session fetches the document and discovers its subresources
//!   (scripts, stylesheets, images, fonts, media, frames, preload hints,
//!   plus `url()`/`@import` references inside stylesheets).
//! - Each observed request is classified by resource kind and origin:
//!   same-origin requests collapse to `'self'`, known CDN subdomains
//!   generalize to `scheme://*.suffix` wildcards, everything else keeps
//!   its literal origin.
//! - The aggregated per-directive sets are normalized once (inject
//!   `'self'`, drop wildcard-covered and base-origin-redundant tokens)
//!   and rendered in fixed directive order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cspgen::CspGenerator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = CspGenerator::default();
//!     let policy = generator.generate("https://example.com", true).await?;
//!     println!("{}", policy);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod error;
pub mod generator;
pub mod network;
pub mod policy;
pub mod server;

// Re-exports for convenience

// Generator
pub use generator::{normalize_url, CspGenerator};

// Policy pipeline
pub use policy::{resolve_origin, BaseOrigin, Directive, Policy, PolicyBuilder, SourceToken,
    WildcardDomains};

// Browser session
pub use browser::{BrowserSession, PageSession, SessionConfig, WaitStrategy};

// Network events
pub use network::{RequestEvent, ResourceKind};

// Errors
pub use error::{Error, Result};

// HTTP API
pub use server::{ErrorResponse, GenerateRequest, GenerateResponse};

/// cspgen version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
