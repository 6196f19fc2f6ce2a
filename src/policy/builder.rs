// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Policy aggregation, normalization and serialization
//!
//! A [`Policy`] is a mapping from directive to a set of unique source
//! tokens. A [`PolicyBuilder`] mutates one policy for the duration of a
//! single page-load phase; the finished aggregation is then normalized
//! once and rendered. Normalization never runs incrementally per event:
//! the redundancy rules assume the sets are complete.

use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;

use super::directive::Directive;
use super::source::{resolve_origin, BaseOrigin, SourceToken, WildcardDomains};
use crate::network::{RequestEvent, ResourceKind};

/// A CSP policy: per-directive sets of unique source tokens.
///
/// Keyed by [`Directive`], whose ordering is declaration order, so
/// iteration and rendering are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    directives: BTreeMap<Directive, HashSet<SourceToken>>,
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy {
    /// Create a fresh policy with `default-src 'self'` preseeded
    pub fn new() -> Self {
        let mut directives = BTreeMap::new();
        for directive in Directive::ALL {
            directives.insert(directive, HashSet::new());
        }
        if let Some(set) = directives.get_mut(&Directive::DefaultSrc) {
            set.insert(SourceToken::SelfOrigin);
        }
        Self { directives }
    }

    /// Add a token to a directive's set; duplicates are absorbed
    pub fn add(&mut self, directive: Directive, token: SourceToken) {
        self.directives.entry(directive).or_default().insert(token);
    }

    /// Tokens currently held by a directive
    pub fn tokens(&self, directive: Directive) -> &HashSet<SourceToken> {
        &self.directives[&directive]
    }

    /// Whether a directive holds a specific token
    pub fn contains(&self, directive: Directive, token: &SourceToken) -> bool {
        self.directives[&directive].contains(token)
    }

    /// Normalize the finished aggregation. Pure and idempotent.
    ///
    /// For every non-empty directive except `default-src`:
    /// 1. inject `'self'` so the directive cannot lock out same-origin
    ///    resources once any restriction is declared,
    /// 2. drop literal origins covered by a wildcard in the same set,
    /// 3. drop the literal form of the base origin (redundant with `'self'`).
    /// Keywords and scheme tokens pass through untouched.
    pub fn normalized(&self, base: &BaseOrigin) -> Policy {
        let mut out = BTreeMap::new();

        for (directive, tokens) in &self.directives {
            if *directive == Directive::DefaultSrc || tokens.is_empty() {
                out.insert(*directive, tokens.clone());
                continue;
            }

            let mut set: HashSet<SourceToken> = tokens
                .iter()
                .filter(|token| match token {
                    SourceToken::Origin(origin) => {
                        origin != base.as_str()
                            && !tokens.iter().any(|other| token.covered_by(other))
                    }
                    _ => true,
                })
                .cloned()
                .collect();
            set.insert(SourceToken::SelfOrigin);

            out.insert(*directive, set);
        }

        Policy { directives: out }
    }

    /// Serialize the policy into its header string form.
    ///
    /// Directives render in declaration order; empty directives are
    /// omitted. Within a directive, quoted keywords sort before all other
    /// tokens, then ordinal order inside each group.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (directive, tokens) in &self.directives {
            if tokens.is_empty() {
                continue;
            }

            let mut sources: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            sources.sort_by(|a, b| {
                let a_quoted = a.starts_with('\'');
                let b_quoted = b.starts_with('\'');
                b_quoted.cmp(&a_quoted).then_with(|| a.cmp(b))
            });

            out.push_str(directive.name());
            for source in &sources {
                out.push(' ');
                out.push_str(source);
            }
            out.push_str("; ");
        }

        out.trim_end().to_string()
    }
}

/// Accumulates resolved source tokens as request events arrive.
///
/// Events may be delivered from concurrent fetch tasks; the underlying
/// policy is guarded by a mutex so ingestion into the same directive's
/// set never loses updates. Aggregation is commutative and idempotent
/// per token, so arrival order does not affect the final result.
pub struct PolicyBuilder {
    base: BaseOrigin,
    table: WildcardDomains,
    wildcards_enabled: bool,
    policy: Mutex<Policy>,
}

impl PolicyBuilder {
    /// Create a builder for one page-load phase
    pub fn new(base: BaseOrigin, table: WildcardDomains, wildcards_enabled: bool) -> Self {
        Self {
            base,
            table,
            wildcards_enabled,
            policy: Mutex::new(Policy::new()),
        }
    }

    /// Base origin this builder classifies against
    pub fn base(&self) -> &BaseOrigin {
        &self.base
    }

    /// Ingest one observed request. Events that classify to no directive,
    /// fail origin resolution, or are same-origin frame navigations
    /// contribute nothing.
    pub fn ingest(&self, event: &RequestEvent) {
        // data: URIs are not parseable as an origin; only image requests
        // carry the data: scheme token, everything else is dropped.
        if event.is_data_uri() {
            if event.kind == ResourceKind::Image {
                self.policy
                    .lock()
                    .add(Directive::ImgSrc, SourceToken::data());
            }
            return;
        }

        let Some(directive) = Directive::for_kind(event.kind) else {
            return;
        };

        let Some(token) =
            resolve_origin(&event.url, &self.base, &self.table, self.wildcards_enabled)
        else {
            return;
        };

        // The page's own navigation must not populate frame-src; only
        // sub-frames from a different origin do.
        if directive == Directive::FrameSrc && token == SourceToken::SelfOrigin {
            return;
        }

        self.policy.lock().add(directive, token);
    }

    /// Finish the page-load phase: normalize once and render the policy
    pub fn finish(&self) -> String {
        self.policy.lock().normalized(&self.base).render()
    }

    /// Snapshot of the raw aggregation (pre-normalization)
    pub fn snapshot(&self) -> Policy {
        self.policy.lock().clone()
    }
}
