// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSP directives and resource-kind classification

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::ResourceKind;

/// A CSP directive tracked by the generator.
///
/// Declaration order is output order: the serializer renders populated
/// directives top to bottom as listed here, with `default-src` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Directive {
    ScriptSrc,
    StyleSrc,
    ImgSrc,
    FontSrc,
    ConnectSrc,
    MediaSrc,
    FrameSrc,
    ObjectSrc,
    DefaultSrc,
}

impl Directive {
    /// All directives in declaration (output) order
    pub const ALL: [Directive; 9] = [
        Directive::ScriptSrc,
        Directive::StyleSrc,
        Directive::ImgSrc,
        Directive::FontSrc,
        Directive::ConnectSrc,
        Directive::MediaSrc,
        Directive::FrameSrc,
        Directive::ObjectSrc,
        Directive::DefaultSrc,
    ];

    /// Directive name as it appears in a policy string
    pub fn name(&self) -> &'static str {
        match self {
            Directive::ScriptSrc => "script-src",
            Directive::StyleSrc => "style-src",
            Directive::ImgSrc => "img-src",
            Directive::FontSrc => "font-src",
            Directive::ConnectSrc => "connect-src",
            Directive::MediaSrc => "media-src",
            Directive::FrameSrc => "frame-src",
            Directive::ObjectSrc => "object-src",
            Directive::DefaultSrc => "default-src",
        }
    }

    /// Map an observed resource kind to the directive it populates.
    ///
    /// `None` discards the event. Plugin content (`object`/`embed`) and
    /// unrecognized kinds are discarded deliberately so that new kinds
    /// fail closed instead of landing in the wrong directive.
    pub fn for_kind(kind: ResourceKind) -> Option<Directive> {
        match kind {
            ResourceKind::Script => Some(Directive::ScriptSrc),
            ResourceKind::Stylesheet => Some(Directive::StyleSrc),
            ResourceKind::Image => Some(Directive::ImgSrc),
            ResourceKind::Font => Some(Directive::FontSrc),
            ResourceKind::Xhr | ResourceKind::Fetch => Some(Directive::ConnectSrc),
            ResourceKind::Media => Some(Directive::MediaSrc),
            ResourceKind::Document | ResourceKind::IFrame => Some(Directive::FrameSrc),
            ResourceKind::Object | ResourceKind::Other => None,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
