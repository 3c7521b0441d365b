/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Pub-sub backend seam reached by producer and consumer endpoints.

use crate::error::DeliveryError;
use crate::routing::stream_identity::StreamIdentity;
use crate::runtime::stream_item::StreamEvent;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one consumer subscription.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Receives events dispatched by a pub-sub backend for one subscription.
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn deliver(&self, event: StreamEvent);
}

/// Delivery backend selected by the provider's [`DeliveryMode`](crate::DeliveryMode).
///
/// Implementations own fan-out, queueing, and retry. Fan-out should hand each
/// sink [`StreamEvent::for_target`] so that non-shared items are copied per target.
#[async_trait]
pub trait StreamPubSub: Send + Sync {
    async fn register_consumer(
        &self,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), DeliveryError>;

    async fn unregister_consumer(
        &self,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
    ) -> Result<(), DeliveryError>;

    async fn consumer_subscriptions(
        &self,
        stream: &StreamIdentity,
    ) -> Result<Vec<SubscriptionId>, DeliveryError>;

    /// Resolves when every current subscriber acknowledged the event.
    async fn publish(
        &self,
        stream: &StreamIdentity,
        event: StreamEvent,
    ) -> Result<(), DeliveryError>;
}
