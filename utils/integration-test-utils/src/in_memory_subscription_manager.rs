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

use async_trait::async_trait;
use message_stream_provider::{
    DeliveryError, DeliveryErrorKind, StreamIdentity, StreamSubscription,
    StreamSubscriptionManager, SubscriptionId, SubscriptionManagerRegistry,
    SubscriptionManagerType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Explicit subscription store kept in memory.
#[derive(Default)]
pub struct InMemorySubscriptionManager {
    subscriptions: Mutex<Vec<StreamSubscription>>,
    reject_adds: bool,
    reject_removes: bool,
}

impl InMemorySubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager refusing every new subscription.
    pub fn rejecting() -> Self {
        Self {
            reject_adds: true,
            ..Self::default()
        }
    }

    /// A manager accepting subscriptions but refusing to remove any.
    pub fn rejecting_removals() -> Self {
        Self {
            reject_removes: true,
            ..Self::default()
        }
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}

#[async_trait]
impl StreamSubscriptionManager for InMemorySubscriptionManager {
    async fn add_subscription(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
        subscriber: &str,
    ) -> Result<StreamSubscription, DeliveryError> {
        if self.reject_adds {
            return Err(DeliveryError::new(
                DeliveryErrorKind::Rejected,
                "subscription store is read-only",
            ));
        }

        let subscription = StreamSubscription {
            subscription_id,
            stream_provider: stream_provider.to_string(),
            stream: stream.clone(),
            subscriber: subscriber.to_string(),
        };
        self.subscriptions.lock().await.push(subscription.clone());
        Ok(subscription)
    }

    async fn remove_subscription(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
    ) -> Result<(), DeliveryError> {
        if self.reject_removes {
            return Err(DeliveryError::new(
                DeliveryErrorKind::Rejected,
                format!("subscription {subscription_id} on {stream} is pinned"),
            ));
        }

        let mut subscriptions = self.subscriptions.lock().await;
        let before = subscriptions.len();
        subscriptions.retain(|subscription| {
            !(subscription.subscription_id == subscription_id
                && subscription.stream_provider == stream_provider
                && &subscription.stream == stream)
        });

        if subscriptions.len() == before {
            return Err(DeliveryError::new(
                DeliveryErrorKind::NotFound,
                format!("no subscription {subscription_id} on {stream}"),
            ));
        }
        Ok(())
    }

    async fn get_subscriptions(
        &self,
        stream_provider: &str,
        stream: &StreamIdentity,
    ) -> Result<Vec<StreamSubscription>, DeliveryError> {
        Ok(self
            .subscriptions
            .lock()
            .await
            .iter()
            .filter(|subscription| {
                subscription.stream_provider == stream_provider && &subscription.stream == stream
            })
            .cloned()
            .collect())
    }
}

/// Registry serving one explicit-subscribe-only manager and counting lookups.
pub struct InMemorySubscriptionManagerRegistry {
    manager: Option<Arc<InMemorySubscriptionManager>>,
    lookup_delay: Option<Duration>,
    lookups: AtomicUsize,
}

impl InMemorySubscriptionManagerRegistry {
    pub fn new(manager: Arc<InMemorySubscriptionManager>) -> Self {
        Self {
            manager: Some(manager),
            lookup_delay: None,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Registry answering each lookup only after `lookup_delay`.
    pub fn with_lookup_delay(
        manager: Arc<InMemorySubscriptionManager>,
        lookup_delay: Duration,
    ) -> Self {
        Self {
            lookup_delay: Some(lookup_delay),
            ..Self::new(manager)
        }
    }

    /// A registry with no explicit-subscribe-only backend registered.
    pub fn empty() -> Self {
        Self {
            manager: None,
            lookup_delay: None,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionManagerRegistry for InMemorySubscriptionManagerRegistry {
    async fn stream_subscription_manager(
        &self,
        manager_type: SubscriptionManagerType,
    ) -> Option<Arc<dyn StreamSubscriptionManager>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(lookup_delay) = self.lookup_delay {
            tokio::time::sleep(lookup_delay).await;
        }

        match manager_type {
            SubscriptionManagerType::ExplicitSubscribeOnly => self
                .manager
                .clone()
                .map(|manager| manager as Arc<dyn StreamSubscriptionManager>),
        }
    }
}
