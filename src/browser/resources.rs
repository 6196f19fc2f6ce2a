// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Subresource discovery
//!
//! Walks a parsed document and collects every resource reference the page
//! would request: scripts, stylesheets, images, fonts, media, frames and
//! preload hints. Stylesheet text (inline and fetched) is scanned for
//! `url(...)` and `@import` references.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::ParseOpts;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use url::Url;

use crate::network::ResourceKind;

lazy_static! {
    static ref CSS_URL: Regex = Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).unwrap();
    static ref CSS_IMPORT: Regex =
        Regex::new(r#"@import\s+(?:url\(\s*)?['"]?([^'")\s;]+)"#).unwrap();
}

/// A resource reference discovered in a document or stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredResource {
    /// Absolute request URL (or the raw `data:` URI)
    pub url: String,
    /// Kind of resource the reference would load
    pub kind: ResourceKind,
}

impl DiscoveredResource {
    fn new(url: String, kind: ResourceKind) -> Self {
        Self { url, kind }
    }
}

/// Parse an HTML document and collect its subresource references.
///
/// Relative references are resolved against `base`; references that do
/// not resolve are dropped, mirroring the per-resource soft-failure rule
/// of the policy pipeline.
pub fn discover_resources(html: &str, base: &Url) -> Vec<DiscoveredResource> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

    let mut collector = ResourceCollector {
        base,
        resources: Vec::new(),
    };
    collector.walk(&dom.document, None);
    collector.resources
}

/// Scan stylesheet text for `url(...)` and `@import` references.
///
/// Font file extensions classify as fonts, `@import` targets and `.css`
/// references as stylesheets, everything else as images (background
/// images are by far the most common `url()` payload).
pub fn extract_css_resources(css: &str, base: &Url) -> Vec<DiscoveredResource> {
    let mut resources = Vec::new();

    for capture in CSS_IMPORT.captures_iter(css) {
        if let Some(url) = resolve(base, &capture[1]) {
            resources.push(DiscoveredResource::new(url, ResourceKind::Stylesheet));
        }
    }

    for capture in CSS_URL.captures_iter(css) {
        let raw = capture[1].trim();
        if raw.starts_with("data:") {
            // data: URIs in CSS are overwhelmingly inlined images
            resources.push(DiscoveredResource::new(
                raw.to_string(),
                ResourceKind::Image,
            ));
            continue;
        }
        let Some(url) = resolve(base, raw) else {
            continue;
        };
        let kind = classify_css_reference(&url);
        if kind != ResourceKind::Stylesheet {
            // .css urls are already captured by the @import pass
            resources.push(DiscoveredResource::new(url, kind));
        }
    }

    resources
}

fn classify_css_reference(url: &str) -> ResourceKind {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    if path.ends_with(".woff")
        || path.ends_with(".woff2")
        || path.ends_with(".ttf")
        || path.ends_with(".otf")
        || path.ends_with(".eot")
    {
        ResourceKind::Font
    } else if path.ends_with(".css") {
        ResourceKind::Stylesheet
    } else {
        ResourceKind::Image
    }
}

fn resolve(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || raw.starts_with("javascript:") {
        return None;
    }
    if raw.starts_with("data:") {
        return Some(raw.to_string());
    }
    base.join(raw).ok().map(|u| u.to_string())
}

struct ResourceCollector<'a> {
    base: &'a Url,
    resources: Vec<DiscoveredResource>,
}

impl ResourceCollector<'_> {
    fn walk(&mut self, handle: &Handle, parent_tag: Option<&str>) {
        let mut tag_name: Option<String> = None;

        if let NodeData::Element { name, attrs, .. } = &handle.data {
            let tag = name.local.as_ref().to_lowercase();
            self.visit_element(&tag, &attrs.borrow(), parent_tag);
            tag_name = Some(tag);
        }

        // Inline <style> blocks carry CSS text as child text nodes
        if tag_name.as_deref() == Some("style") {
            let mut css = String::new();
            for child in handle.children.borrow().iter() {
                if let NodeData::Text { contents } = &child.data {
                    css.push_str(&contents.borrow());
                }
            }
            self.resources.extend(extract_css_resources(&css, self.base));
            return;
        }

        for child in handle.children.borrow().iter() {
            self.walk(child, tag_name.as_deref().or(parent_tag));
        }
    }

    fn visit_element(
        &mut self,
        tag: &str,
        attrs: &[html5ever::Attribute],
        parent_tag: Option<&str>,
    ) {
        let attr = |name: &str| {
            attrs
                .iter()
                .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
                .map(|a| a.value.to_string())
        };

        match tag {
            "script" => {
                if let Some(src) = attr("src") {
                    self.push(&src, ResourceKind::Script);
                }
            }
            "link" => {
                let rel = attr("rel").unwrap_or_default().to_lowercase();
                let Some(href) = attr("href") else { return };
                if rel.split_whitespace().any(|r| r == "stylesheet") {
                    self.push(&href, ResourceKind::Stylesheet);
                } else if rel == "modulepreload" {
                    self.push(&href, ResourceKind::Script);
                } else if rel == "preload" {
                    let kind = match attr("as").unwrap_or_default().as_str() {
                        "script" => ResourceKind::Script,
                        "style" => ResourceKind::Stylesheet,
                        "font" => ResourceKind::Font,
                        "image" => ResourceKind::Image,
                        "fetch" => ResourceKind::Fetch,
                        "video" | "audio" => ResourceKind::Media,
                        _ => return,
                    };
                    self.push(&href, kind);
                }
            }
            "img" => {
                if let Some(src) = attr("src") {
                    self.push(&src, ResourceKind::Image);
                }
                if let Some(srcset) = attr("srcset") {
                    for candidate in srcset_urls(&srcset) {
                        self.push(&candidate, ResourceKind::Image);
                    }
                }
            }
            "source" => {
                // <picture><source> references images; <video>/<audio>
                // <source> references media
                let kind = match parent_tag {
                    Some("picture") => ResourceKind::Image,
                    _ => ResourceKind::Media,
                };
                if let Some(src) = attr("src") {
                    self.push(&src, kind);
                }
                if let Some(srcset) = attr("srcset") {
                    for candidate in srcset_urls(&srcset) {
                        self.push(&candidate, kind);
                    }
                }
            }
            "video" | "audio" => {
                if let Some(src) = attr("src") {
                    self.push(&src, ResourceKind::Media);
                }
                if let Some(poster) = attr("poster") {
                    self.push(&poster, ResourceKind::Image);
                }
            }
            "iframe" | "frame" => {
                if let Some(src) = attr("src") {
                    self.push(&src, ResourceKind::IFrame);
                }
            }
            "object" => {
                if let Some(data) = attr("data") {
                    self.push(&data, ResourceKind::Object);
                }
            }
            "embed" => {
                if let Some(src) = attr("src") {
                    self.push(&src, ResourceKind::Object);
                }
            }
            _ => {}
        }
    }

    fn push(&mut self, raw: &str, kind: ResourceKind) {
        if let Some(url) = resolve(self.base, raw) {
            self.resources.push(DiscoveredResource::new(url, kind));
        }
    }
}

/// Extract the URL part of each srcset candidate
fn srcset_urls(srcset: &str) -> Vec<String> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    fn kinds_of(resources: &[DiscoveredResource], kind: ResourceKind) -> Vec<&str> {
        resources
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.url.as_str())
            .collect()
    }

    #[test]
    fn test_basic_document() {
        let html = r#"<html><head>
            <script src="/app.js"></script>
            <link rel="stylesheet" href="style.css">
        </head><body>
            <img src="https://cdn.example.net/logo.png">
            <iframe src="https://embed.example.org/player"></iframe>
        </body></html>"#;

        let resources = discover_resources(html, &base());

        assert_eq!(
            kinds_of(&resources, ResourceKind::Script),
            vec!["https://example.com/app.js"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Stylesheet),
            vec!["https://example.com/page/style.css"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Image),
            vec!["https://cdn.example.net/logo.png"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::IFrame),
            vec!["https://embed.example.org/player"]
        );
    }

    #[test]
    fn test_preload_hints() {
        let html = r#"<head>
            <link rel="preload" as="font" href="/f.woff2">
            <link rel="preload" as="fetch" href="/api/boot.json">
            <link rel="preload" as="track" href="/captions.vtt">
            <link rel="modulepreload" href="/mod.mjs">
        </head>"#;

        let resources = discover_resources(html, &base());

        assert_eq!(
            kinds_of(&resources, ResourceKind::Font),
            vec!["https://example.com/f.woff2"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Fetch),
            vec!["https://example.com/api/boot.json"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Script),
            vec!["https://example.com/mod.mjs"]
        );
        // Unmapped preload kinds are dropped
        assert!(!resources.iter().any(|r| r.url.contains("captions")));
    }

    #[test]
    fn test_data_uri_image_kept_raw() {
        let html = r#"<img src="data:image/png;base64,iVBORw0KGgo=">"#;
        let resources = discover_resources(html, &base());
        assert_eq!(resources.len(), 1);
        assert!(resources[0].url.starts_with("data:image/png"));
        assert_eq!(resources[0].kind, ResourceKind::Image);
    }

    #[test]
    fn test_inline_style_urls() {
        let html = r#"<style>
            @import "extra.css";
            body { background: url('/bg.jpg'); }
            @font-face { src: url(fonts/brand.woff2) format("woff2"); }
        </style>"#;

        let resources = discover_resources(html, &base());

        assert_eq!(
            kinds_of(&resources, ResourceKind::Stylesheet),
            vec!["https://example.com/page/extra.css"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Image),
            vec!["https://example.com/bg.jpg"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Font),
            vec!["https://example.com/page/fonts/brand.woff2"]
        );
    }

    #[test]
    fn test_css_extraction() {
        let css = r#"
            @import url("theme.css");
            .hero { background-image: url("https://img.example.net/hero.webp?w=1200"); }
            @font-face { src: url('/f/a.ttf'); }
        "#;
        let resources = extract_css_resources(css, &base());

        assert_eq!(
            kinds_of(&resources, ResourceKind::Stylesheet),
            vec!["https://example.com/page/theme.css"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Image),
            vec!["https://img.example.net/hero.webp?w=1200"]
        );
        assert_eq!(
            kinds_of(&resources, ResourceKind::Font),
            vec!["https://example.com/f/a.ttf"]
        );
    }

    #[test]
    fn test_picture_source_is_image_video_source_is_media() {
        let html = r#"
            <picture><source srcset="/big.avif"><img src="/small.png"></picture>
            <video><source src="/clip.mp4"></video>
        "#;
        let resources = discover_resources(html, &base());

        let images = kinds_of(&resources, ResourceKind::Image);
        assert!(images.contains(&"https://example.com/big.avif"));
        assert!(images.contains(&"https://example.com/small.png"));
        assert_eq!(
            kinds_of(&resources, ResourceKind::Media),
            vec!["https://example.com/clip.mp4"]
        );
    }

    #[test]
    fn test_srcset_parsing() {
        let urls = srcset_urls("/a.png 1x, /b.png 2x,/c.png 480w");
        assert_eq!(urls, vec!["/a.png", "/b.png", "/c.png"]);
    }

    #[test]
    fn test_unresolvable_references_dropped() {
        let html = r#"<script src=""></script><img src="javascript:void(0)">"#;
        let resources = discover_resources(html, &base());
        assert!(resources.is_empty());
    }
}
