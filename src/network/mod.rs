// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network observation
//!
//! Request events emitted by a page session while a page loads.

mod event;

pub use event::{RequestEvent, ResourceKind};
