// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSP generation orchestration
//!
//! One invocation: normalize the input URL, run one page-load phase
//! through a browser session, funnel every observed request through the
//! policy pipeline, and serialize the result. The session is closed on
//! every exit path before any error propagates.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::browser::{BrowserSession, PageSession, SessionConfig, WaitStrategy};
use crate::error::{Error, Result};
use crate::policy::{BaseOrigin, PolicyBuilder, WildcardDomains};

/// CSP generator: one instance can serve many independent invocations.
///
/// No state is shared between invocations; each `generate` call launches
/// its own session and builds its own policy.
#[derive(Debug, Clone)]
pub struct CspGenerator {
    config: SessionConfig,
    wildcard_domains: WildcardDomains,
}

impl Default for CspGenerator {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl CspGenerator {
    /// Create a generator with the default wildcard-domain table
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            wildcard_domains: WildcardDomains::default(),
        }
    }

    /// Replace the wildcard-domain table
    pub fn wildcard_domains(mut self, table: WildcardDomains) -> Self {
        self.wildcard_domains = table;
        self
    }

    /// Generate a CSP policy string for a page.
    ///
    /// Protocol-less inputs are prefixed with `https://` before parsing;
    /// an input that still does not parse fails with `InvalidInput` and
    /// no navigation is attempted.
    pub async fn generate(&self, url: &str, use_wildcards: bool) -> Result<String> {
        let target = normalize_url(url)?;
        info!(url = %target, wildcards = use_wildcards, "generating CSP");

        let session: Arc<dyn BrowserSession> =
            Arc::new(PageSession::launch(self.config.clone())?);
        let result = self.run(session.clone(), &target, use_wildcards).await;
        // Resource safety over error reporting order: the session closes
        // before any navigation error propagates
        session.close().await;
        result
    }

    async fn run(
        &self,
        session: Arc<dyn BrowserSession>,
        target: &Url,
        use_wildcards: bool,
    ) -> Result<String> {
        let base = BaseOrigin::from_url(target);
        let builder = Arc::new(PolicyBuilder::new(
            base,
            self.wildcard_domains.clone(),
            use_wildcards,
        ));

        // Single sequential consumer: events may be produced by concurrent
        // fetch tasks, but aggregation happens on one task
        let mut receiver = session
            .subscribe()
            .ok_or_else(|| Error::other("session event channel already taken"))?;
        let ingest = {
            let builder = Arc::clone(&builder);
            tokio::spawn(async move {
                while let Some(event) = receiver.recv().await {
                    builder.ingest(&event);
                }
            })
        };

        let navigation = self.navigate_with_escalation(session.as_ref(), target).await;
        // Terminate the channel so the consumer drains and exits even on
        // navigation failure
        session.close().await;
        let _ = ingest.await;

        navigation?;
        Ok(builder.finish())
    }

    /// Three-tier escalating wait policy: networkidle, then structural
    /// content plus settle, then full load plus settle. The first tier to
    /// succeed ends the wait; exhausting all three fails the invocation
    /// with the last tier's error surfaced unchanged.
    async fn navigate_with_escalation(
        &self,
        session: &dyn BrowserSession,
        target: &Url,
    ) -> Result<()> {
        let mut last_error: Option<Error> = None;

        for strategy in WaitStrategy::ESCALATION {
            match session
                .navigate(target, strategy, self.config.nav_timeout)
                .await
            {
                Ok(()) => {
                    info!(url = %target, strategy = strategy.as_str(), "page loaded");
                    return Ok(());
                }
                Err(e) => {
                    // Unreachable hosts fail identically on every tier;
                    // surface those immediately instead of retrying
                    if matches!(e, Error::NameResolution { .. }) {
                        return Err(e);
                    }
                    warn!(
                        url = %target,
                        strategy = strategy.as_str(),
                        error = %e,
                        "wait tier failed, escalating"
                    );
                    last_error = Some(e);
                }
            }
        }

        // Deterministic transport failures keep their kind so the API and
        // CLI surface them as such; a timeout here is already a
        // NavigationTimeout from the tier that exhausted its deadline
        Err(last_error.unwrap_or_else(|| {
            Error::navigation_timeout(target.as_str(), "all wait tiers exhausted")
        }))
    }
}

/// Normalize user input into a navigable URL.
///
/// Trims whitespace and prefixes `https://` when no explicit http(s)
/// scheme is present, so `example.com` works as input.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input(input, "URL is empty"));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url =
        Url::parse(&candidate).map_err(|e| Error::invalid_input(trimmed, e.to_string()))?;
    if url.host_str().is_none() {
        return Err(Error::invalid_input(trimmed, "URL has no host"));
    }
    Ok(url)
}
