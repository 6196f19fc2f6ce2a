// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session configuration

use std::time::Duration;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 cspgen/0.1";

/// Page session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// User agent string
    pub user_agent: String,
    /// Deadline for each navigation wait tier
    pub nav_timeout: Duration,
    /// Settling pause after the structural-content tier, to let in-flight
    /// resource loads keep firing events
    pub dom_settle: Duration,
    /// Shorter settling pause after the full-load tier
    pub load_settle: Duration,
    /// Maximum concurrent subresource fetches
    pub concurrency: usize,
    /// Maximum subresources to fetch per page
    pub max_subresources: usize,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            nav_timeout: Duration::from_secs(30),
            dom_settle: Duration::from_secs(3),
            load_settle: Duration::from_secs(2),
            concurrency: 8,
            max_subresources: 200,
            ignore_https_errors: false,
        }
    }
}

impl SessionConfig {
    /// Create a new session config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-tier navigation deadline
    pub fn nav_timeout(mut self, timeout: Duration) -> Self {
        self.nav_timeout = timeout;
        self
    }

    /// Set the settling pauses after the fallback wait tiers
    pub fn settle(mut self, dom: Duration, load: Duration) -> Self {
        self.dom_settle = dom;
        self.load_settle = load;
        self
    }

    /// Set maximum concurrent subresource fetches
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }
}
