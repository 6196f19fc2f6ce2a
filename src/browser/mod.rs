// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page session: fetch a page the way a browser would load it
//!
//! A [`PageSession`] navigates to a URL, discovers the subresources the
//! document references, and emits one [`crate::network::RequestEvent`]
//! per observed request on its event channel.

mod config;
mod resources;
mod session;

pub use config::SessionConfig;
pub use resources::{discover_resources, extract_css_resources, DiscoveredResource};
pub use session::{BrowserSession, PageSession, WaitStrategy};
