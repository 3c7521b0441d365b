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

//! Explicit-subscription management seam and its keyed registry.

use crate::error::DeliveryError;
use crate::routing::stream_identity::StreamIdentity;
use crate::runtime::pub_sub::SubscriptionId;
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Backend-type key used to look up a subscription manager.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SubscriptionManagerType {
    ExplicitSubscribeOnly,
}

impl SubscriptionManagerType {
    pub fn key(&self) -> &'static str {
        match self {
            SubscriptionManagerType::ExplicitSubscribeOnly => "explicit-subscribe-only",
        }
    }
}

impl Display for SubscriptionManagerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One explicit subscription recorded by a subscription manager.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StreamSubscription {
    pub subscription_id: SubscriptionId,
    pub stream_provider: String,
    pub stream: StreamIdentity,
    pub subscriber: String,
}

/// Persists explicit subscriptions on behalf of providers.
#[async_trait]
pub trait StreamSubscriptionManager: Send + Sync {
    async fn add_subscription(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
        subscriber: &str,
    ) -> Result<StreamSubscription, DeliveryError>;

    async fn remove_subscription(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
    ) -> Result<(), DeliveryError>;

    async fn get_subscriptions(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
    ) -> Result<Vec<StreamSubscription>, DeliveryError>;
}

/// Keyed registry producing subscription managers by backend type.
#[async_trait]
pub trait SubscriptionManagerRegistry: Send + Sync {
    async fn stream_subscription_manager(
        &self,
        manager_type: SubscriptionManagerType,
    ) -> Option<Arc<dyn StreamSubscriptionManager>>;
}

#[cfg(test)]
mod tests {
    use super::SubscriptionManagerType;

    #[test]
    fn explicit_subscribe_only_key_is_stable() {
        assert_eq!(
            SubscriptionManagerType::ExplicitSubscribeOnly.key(),
            "explicit-subscribe-only"
        );
        assert_eq!(
            SubscriptionManagerType::ExplicitSubscribeOnly.to_string(),
            "explicit-subscribe-only"
        );
    }
}
