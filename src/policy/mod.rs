// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSP policy pipeline
//!
//! Turns a stream of (request URL, resource kind) observations into a
//! deduplicated, wildcard-aware Content-Security-Policy string:
//!
//! 1. classify the resource kind into a directive ([`Directive::for_kind`])
//! 2. resolve the request URL into a source token ([`resolve_origin`])
//! 3. aggregate tokens into per-directive sets ([`PolicyBuilder`])
//! 4. normalize the finished sets once ([`Policy::normalized`])
//! 5. serialize in fixed directive order ([`Policy::render`])

mod builder;
mod directive;
mod source;

pub use builder::{Policy, PolicyBuilder};
pub use directive::Directive;
pub use source::{resolve_origin, BaseOrigin, SourceToken, WildcardDomains};
