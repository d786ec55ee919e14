//! Push Notifications Module
//!
//! Browser push subscriptions and the new-recipe fan-out.
//!
//! # Architecture
//!
//! - **`push`** - subscription types, `PushDelivery` trait, VAPID transport
//! - **`fanout`** - `NotificationFanout`: registry, eviction, detached dispatch
//! - **`handlers`** - `POST /subscriptions/`, `GET /webpush_public_key`
//!
//! # Origin Exclusion
//!
//! Push is the only channel that skips the originating session. Shopping-list
//! change events go to every stream, the writer's included.

/// Subscriptions and delivery transport
pub mod push;

/// New-recipe fan-out
pub mod fanout;

/// HTTP handlers
pub mod handlers;

pub use fanout::{FanoutReport, NotificationFanout};
pub use push::{PushDelivery, PushError, PushSubscription, VapidPushDelivery};
