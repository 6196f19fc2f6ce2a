// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request event types
//!
//! A page session emits one [`RequestEvent`] per observed outgoing request.
//! Events carry only what the policy pipeline needs: the request URL and
//! the kind of resource being loaded.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Kind of resource an observed request is loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Top-level document navigation
    Document,
    /// Iframe navigation
    IFrame,
    /// Script tag
    Script,
    /// Link stylesheet (or CSS @import)
    Stylesheet,
    /// Image
    Image,
    /// Font
    Font,
    /// XMLHttpRequest
    Xhr,
    /// Fetch API (or preload as=fetch)
    Fetch,
    /// Media (audio/video)
    Media,
    /// Plugin content (object/embed)
    Object,
    /// Unrecognized resource kind
    Other,
}

impl ResourceKind {
    /// Parse a collaborator's resource-kind label.
    ///
    /// Unknown labels map to [`ResourceKind::Other`], which the policy
    /// pipeline discards. New kinds fail closed rather than silently
    /// landing in the wrong directive.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "document" => ResourceKind::Document,
            "frame" | "iframe" => ResourceKind::IFrame,
            "script" => ResourceKind::Script,
            "stylesheet" | "style" => ResourceKind::Stylesheet,
            "image" | "img" => ResourceKind::Image,
            "font" => ResourceKind::Font,
            "xhr" => ResourceKind::Xhr,
            "fetch" => ResourceKind::Fetch,
            "media" | "audio" | "video" => ResourceKind::Media,
            "object" | "embed" => ResourceKind::Object,
            _ => ResourceKind::Other,
        }
    }

    /// Canonical label for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Document => "document",
            ResourceKind::IFrame => "iframe",
            ResourceKind::Script => "script",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Image => "image",
            ResourceKind::Font => "font",
            ResourceKind::Xhr => "xhr",
            ResourceKind::Fetch => "fetch",
            ResourceKind::Media => "media",
            ResourceKind::Object => "object",
            ResourceKind::Other => "other",
        }
    }
}

/// One observed outgoing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEvent {
    /// Request URL as observed (may be unparsable; resolution skips those)
    pub url: String,
    /// Kind of resource being requested
    pub kind: ResourceKind,
    /// When the request was observed
    pub timestamp: SystemTime,
}

impl RequestEvent {
    /// Create a new request event
    pub fn new(url: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            url: url.into(),
            kind,
            timestamp: SystemTime::now(),
        }
    }

    /// Create an event from a raw (url, kind-label) pair
    pub fn from_parts(url: impl Into<String>, kind_label: &str) -> Self {
        Self::new(url, ResourceKind::from_label(kind_label))
    }

    /// Whether the request targets a data: URI
    pub fn is_data_uri(&self) -> bool {
        self.url.starts_with("data:")
    }
}
