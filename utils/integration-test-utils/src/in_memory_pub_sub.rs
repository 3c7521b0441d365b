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
    DeliveryError, DeliveryErrorKind, StreamEvent, StreamIdentity, StreamPubSub, StreamSink,
    SubscriptionId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

type Sinks = HashMap<SubscriptionId, Arc<dyn StreamSink>>;

/// Pub-sub backend fanning events out to in-process sinks.
///
/// An optional acknowledgment delay holds every publish before fan-out, which makes
/// the difference between awaited and fire-and-forget sends observable.
#[derive(Default)]
pub struct InMemoryPubSub {
    streams: Mutex<HashMap<StreamIdentity, Sinks>>,
    ack_delay: Option<Duration>,
    reject_publish: bool,
    published: AtomicUsize,
    acknowledged: AtomicUsize,
}

impl InMemoryPubSub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ack_delay(ack_delay: Duration) -> Self {
        Self {
            ack_delay: Some(ack_delay),
            ..Self::default()
        }
    }

    /// A backend refusing every published event.
    pub fn rejecting() -> Self {
        Self {
            reject_publish: true,
            ..Self::default()
        }
    }

    /// Number of publish calls received, acknowledged or not.
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }

    /// Number of publish calls that completed fan-out.
    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.load(Ordering::SeqCst)
    }

    pub async fn subscriber_count(&self, stream: &StreamIdentity) -> usize {
        self.streams
            .lock()
            .await
            .get(stream)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl StreamPubSub for InMemoryPubSub {
    async fn register_consumer(
        &self,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), DeliveryError> {
        let mut streams = self.streams.lock().await;
        let sinks = streams.entry(stream.clone()).or_default();
        if sinks.contains_key(&subscription_id) {
            return Err(DeliveryError::new(
                DeliveryErrorKind::AlreadyExists,
                format!("subscription {subscription_id} already registered"),
            ));
        }
        sinks.insert(subscription_id, sink);
        debug!(%stream, %subscription_id, "registered consumer");
        Ok(())
    }

    async fn unregister_consumer(
        &self,
        stream: &StreamIdentity,
        subscription_id: SubscriptionId,
    ) -> Result<(), DeliveryError> {
        let mut streams = self.streams.lock().await;
        let removed = streams
            .get_mut(stream)
            .and_then(|sinks| sinks.remove(&subscription_id));

        match removed {
            Some(_) => {
                debug!(%stream, %subscription_id, "unregistered consumer");
                Ok(())
            }
            None => Err(DeliveryError::new(
                DeliveryErrorKind::NotFound,
                format!("subscription {subscription_id} is not registered on {stream}"),
            )),
        }
    }

    async fn consumer_subscriptions(
        &self,
        stream: &StreamIdentity,
    ) -> Result<Vec<SubscriptionId>, DeliveryError> {
        Ok(self
            .streams
            .lock()
            .await
            .get(stream)
            .map(|sinks| sinks.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn publish(
        &self,
        stream: &StreamIdentity,
        event: StreamEvent,
    ) -> Result<(), DeliveryError> {
        self.published.fetch_add(1, Ordering::SeqCst);

        if self.reject_publish {
            return Err(DeliveryError::new(
                DeliveryErrorKind::Rejected,
                format!("publishing on {stream} is disabled"),
            ));
        }

        if let Some(ack_delay) = self.ack_delay {
            tokio::time::sleep(ack_delay).await;
        }

        // Snapshot the sinks so no lock is held while delivering.
        let sinks: Vec<Arc<dyn StreamSink>> = self
            .streams
            .lock()
            .await
            .get(stream)
            .map(|sinks| sinks.values().cloned().collect())
            .unwrap_or_default();

        for sink in sinks {
            sink.deliver(event.for_target()).await;
        }

        self.acknowledged.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
