// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page load session
//!
//! A [`PageSession`] performs one navigation: it fetches the document,
//! discovers its subresources and emits one request event per observed
//! request. Three wait strategies control how much of the load the
//! session awaits before the caller moves on; the caller escalates
//! through them in order when a tier's deadline is exceeded.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use url::Url;

use super::config::SessionConfig;
use super::resources::{discover_resources, extract_css_resources, DiscoveredResource};
use crate::error::{Error, Result};
use crate::network::{RequestEvent, ResourceKind};

/// How long to wait for a page load before handing control back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Wait until all discovered subresource fetches settle
    NetworkIdle,
    /// Wait for the document's structural content only, then pause for a
    /// fixed settling interval
    DomContentLoaded,
    /// Wait for render-blocking resources (stylesheets, scripts), then
    /// pause for a shorter settling interval
    Load,
}

impl WaitStrategy {
    /// Strategy name used in log and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitStrategy::NetworkIdle => "networkidle",
            WaitStrategy::DomContentLoaded => "domcontentloaded",
            WaitStrategy::Load => "load",
        }
    }

    /// Escalation order: networkidle, then domcontentloaded, then load
    pub const ESCALATION: [WaitStrategy; 3] = [
        WaitStrategy::NetworkIdle,
        WaitStrategy::DomContentLoaded,
        WaitStrategy::Load,
    ];
}

/// Browser session contract consumed by the generator.
///
/// `close` must be safe to call on every exit path; after it runs the
/// event channel terminates and no further events are delivered.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Take the event subscription. Yields `Some` exactly once.
    fn subscribe(&self) -> Option<UnboundedReceiver<RequestEvent>>;

    /// Navigate to a URL with the given wait strategy and deadline
    async fn navigate(&self, url: &Url, wait: WaitStrategy, timeout: Duration) -> Result<()>;

    /// Tear the session down and terminate the event channel
    async fn close(&self);
}

/// Fetch-and-parse page session.
///
/// No JavaScript engine: the session loads the document, walks the DOM
/// for subresource references and follows stylesheets one level deep.
/// Subresource fetches run concurrently; each one emits its event before
/// the fetch starts, so even an aborted tier leaves observations behind.
pub struct PageSession {
    config: SessionConfig,
    client: reqwest::Client,
    sender: Mutex<Option<UnboundedSender<RequestEvent>>>,
    receiver: Mutex<Option<UnboundedReceiver<RequestEvent>>>,
}

impl PageSession {
    /// Launch a session with the given configuration
    pub fn launch(config: SessionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.nav_timeout)
            .danger_accept_invalid_certs(config.ignore_https_errors)
            .build()?;

        let (sender, receiver) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            client,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
        })
    }

    /// Launch with default configuration
    pub fn launch_default() -> Result<Self> {
        Self::launch(SessionConfig::default())
    }

    fn emit(&self, url: impl Into<String>, kind: ResourceKind) {
        if let Some(sender) = self.sender.lock().as_ref() {
            let _ = sender.send(RequestEvent::new(url, kind));
        }
    }

    /// Perform the deadline-bounded part of one navigation
    async fn load(&self, url: &Url, wait: WaitStrategy) -> Result<()> {
        self.emit(url.as_str(), ResourceKind::Document);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::from_navigation(url, e))?;

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::from_navigation(url, e))?;

        let mut resources = discover_resources(&body, &final_url);
        resources.truncate(self.config.max_subresources);
        debug!(
            url = %final_url,
            count = resources.len(),
            strategy = wait.as_str(),
            "discovered subresources"
        );

        for resource in &resources {
            self.emit(&resource.url, resource.kind);
        }

        match wait {
            // Structural content only; in-flight loads fire during the
            // settling pause the caller applies afterwards
            WaitStrategy::DomContentLoaded => Ok(()),
            WaitStrategy::Load => {
                let blocking: Vec<DiscoveredResource> = resources
                    .into_iter()
                    .filter(|r| {
                        matches!(r.kind, ResourceKind::Stylesheet | ResourceKind::Script)
                    })
                    .collect();
                self.fetch_all(blocking).await;
                Ok(())
            }
            WaitStrategy::NetworkIdle => {
                self.fetch_all(resources).await;
                Ok(())
            }
        }
    }

    /// Fetch a batch of subresources with bounded concurrency.
    ///
    /// Stylesheets are scanned for nested references, which are emitted
    /// and fetched in the same pass (one level deep). Individual fetch
    /// failures are logged and skipped; they never fail the navigation.
    async fn fetch_all(&self, resources: Vec<DiscoveredResource>) {
        let nested: Vec<Vec<DiscoveredResource>> = stream::iter(resources)
            .map(|resource| self.fetch_one(resource))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let followups: Vec<DiscoveredResource> = nested
            .into_iter()
            .flatten()
            .filter(|r| r.kind != ResourceKind::Stylesheet)
            .collect();

        for resource in &followups {
            self.emit(&resource.url, resource.kind);
        }

        stream::iter(followups)
            .map(|resource| self.fetch_one(resource))
            .buffer_unordered(self.config.concurrency)
            .collect::<Vec<_>>()
            .await;
    }

    /// Fetch one subresource; returns references discovered inside it
    async fn fetch_one(&self, resource: DiscoveredResource) -> Vec<DiscoveredResource> {
        if !resource.url.starts_with("http") {
            return Vec::new();
        }
        let Ok(url) = Url::parse(&resource.url) else {
            return Vec::new();
        };

        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "subresource fetch failed");
                return Vec::new();
            }
        };

        if resource.kind == ResourceKind::Stylesheet {
            match response.text().await {
                Ok(css) => return extract_css_resources(&css, &url),
                Err(e) => warn!(url = %url, error = %e, "stylesheet read failed"),
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl BrowserSession for PageSession {
    fn subscribe(&self) -> Option<UnboundedReceiver<RequestEvent>> {
        self.receiver.lock().take()
    }

    async fn navigate(&self, url: &Url, wait: WaitStrategy, timeout: Duration) -> Result<()> {
        if self.sender.lock().is_none() {
            return Err(Error::other("session is closed"));
        }

        match tokio::time::timeout(timeout, self.load(url, wait)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::navigation_timeout(
                    url.as_str(),
                    format!("{} deadline of {:?} exceeded", wait.as_str(), timeout),
                ));
            }
        }

        // Fixed settling pauses after the fallback tiers, so late-firing
        // resource loads still land on the event channel
        match wait {
            WaitStrategy::NetworkIdle => {}
            WaitStrategy::DomContentLoaded => tokio::time::sleep(self.config.dom_settle).await,
            WaitStrategy::Load => tokio::time::sleep(self.config.load_settle).await,
        }

        Ok(())
    }

    async fn close(&self) {
        // Dropping the sender terminates the event channel
        self.sender.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quick_config() -> SessionConfig {
        SessionConfig::new()
            .nav_timeout(Duration::from_secs(5))
            .settle(Duration::from_millis(10), Duration::from_millis(10))
    }

    async fn drain(mut receiver: UnboundedReceiver<RequestEvent>) -> Vec<RequestEvent> {
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_navigate_emits_document_and_subresources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><script src="/app.js"></script></head>
                   <body><img src="/logo.png"></body></html>"#,
                "text/html",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let session = PageSession::launch(quick_config()).unwrap();
        let receiver = session.subscribe().unwrap();
        let url = Url::parse(&server.uri()).unwrap();

        session
            .navigate(&url, WaitStrategy::NetworkIdle, Duration::from_secs(5))
            .await
            .unwrap();
        session.close().await;

        let events = drain(receiver).await;
        assert!(events
            .iter()
            .any(|e| e.kind == ResourceKind::Document && e.url.starts_with(&server.uri())));
        assert!(events
            .iter()
            .any(|e| e.kind == ResourceKind::Script && e.url.ends_with("/app.js")));
        assert!(events
            .iter()
            .any(|e| e.kind == ResourceKind::Image && e.url.ends_with("/logo.png")));
    }

    #[tokio::test]
    async fn test_stylesheet_followed_one_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<link rel="stylesheet" href="/main.css">"#,
                "text/html",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/main.css"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "@font-face { src: url('/brand.woff2'); }",
                "text/css",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let session = PageSession::launch(quick_config()).unwrap();
        let receiver = session.subscribe().unwrap();
        let url = Url::parse(&server.uri()).unwrap();

        session
            .navigate(&url, WaitStrategy::NetworkIdle, Duration::from_secs(5))
            .await
            .unwrap();
        session.close().await;

        let events = drain(receiver).await;
        assert!(events
            .iter()
            .any(|e| e.kind == ResourceKind::Font && e.url.ends_with("/brand.woff2")));
    }

    #[tokio::test]
    async fn test_subscribe_yields_once() {
        let session = PageSession::launch(quick_config()).unwrap();
        assert!(session.subscribe().is_some());
        assert!(session.subscribe().is_none());
    }

    #[tokio::test]
    async fn test_navigate_after_close_fails() {
        let session = PageSession::launch(quick_config()).unwrap();
        session.close().await;

        let url = Url::parse("https://example.com").unwrap();
        let result = session
            .navigate(&url, WaitStrategy::Load, Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_deadline_exceeded_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let session = PageSession::launch(quick_config()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();

        let result = session
            .navigate(&url, WaitStrategy::NetworkIdle, Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(e) if e.is_timeout()));
    }
}
