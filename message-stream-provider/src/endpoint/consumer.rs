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

//! Consumer endpoint registering typed observers on one stream.

use crate::error::{DeliveryError, DeliveryErrorKind, ProviderError};
use crate::observability::events;
use crate::routing::stream_identity::StreamIdentity;
use crate::runtime::pub_sub::{StreamPubSub, StreamSink, SubscriptionId};
use crate::runtime::stream_item::StreamEvent;
use crate::runtime::subscription_manager::StreamSubscriptionManager;
use crate::stream_handle::StreamHandle;
use async_trait::async_trait;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "consumer_endpoint";

/// Receives the items of a stream a consumer subscribed to.
#[async_trait]
pub trait StreamObserver<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn on_next(&self, item: Arc<T>);

    async fn on_completed(&self) {}

    async fn on_error(&self, _message: String) {}
}

/// Handle to one active consumer subscription.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StreamSubscriptionHandle {
    subscription_id: SubscriptionId,
    stream: StreamIdentity,
}

impl StreamSubscriptionHandle {
    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    pub fn stream(&self) -> &StreamIdentity {
        &self.stream
    }
}

/// Adapts a typed observer to the type-erased sink a pub-sub backend delivers to.
struct ObserverSink<T>
where
    T: Send + Sync + 'static,
{
    stream: StreamIdentity,
    observer: Arc<dyn StreamObserver<T>>,
}

#[async_trait]
impl<T> StreamSink for ObserverSink<T>
where
    T: Any + Send + Sync,
{
    async fn deliver(&self, event: StreamEvent) {
        match event {
            StreamEvent::Item(item) => match item.downcast::<T>() {
                Ok(item) => self.observer.on_next(item).await,
                Err(item) => warn!(
                    event = events::CONSUMER_DROP_UNEXPECTED_PAYLOAD,
                    component = COMPONENT,
                    stream = %self.stream,
                    payload_type = item.type_name(),
                    expected_type = std::any::type_name::<T>(),
                    "dropping item of unexpected type"
                ),
            },
            StreamEvent::Completed => self.observer.on_completed().await,
            StreamEvent::Error(message) => self.observer.on_error(message).await,
        }
    }
}

/// Registers and removes observers of items of type `T` on a stream.
pub struct ConsumerEndpoint<T> {
    stream: Arc<StreamHandle<T>>,
    pub_sub: Option<Arc<dyn StreamPubSub>>,
    subscription_manager: Option<Arc<dyn StreamSubscriptionManager>>,
}

impl<T> ConsumerEndpoint<T>
where
    T: Any + Send + Sync,
{
    pub(crate) fn new(
        stream: Arc<StreamHandle<T>>,
        pub_sub: Option<Arc<dyn StreamPubSub>>,
        subscription_manager: Option<Arc<dyn StreamSubscriptionManager>>,
    ) -> Self {
        Self {
            stream,
            pub_sub,
            subscription_manager,
        }
    }

    pub fn stream(&self) -> &Arc<StreamHandle<T>> {
        &self.stream
    }

    pub fn is_rewindable(&self) -> bool {
        self.stream.is_rewindable()
    }

    pub fn pub_sub(&self) -> Option<&Arc<dyn StreamPubSub>> {
        self.pub_sub.as_ref()
    }

    /// Explicit subscription manager, present only in explicit delivery modes.
    pub fn subscription_manager(&self) -> Option<&Arc<dyn StreamSubscriptionManager>> {
        self.subscription_manager.as_ref()
    }

    fn require_pub_sub(&self) -> Result<&Arc<dyn StreamPubSub>, ProviderError> {
        self.pub_sub
            .as_ref()
            .ok_or_else(|| ProviderError::NoDeliveryBackend {
                stream: self.stream.identity().clone(),
            })
    }

    /// Subscribes `observer` to this stream.
    ///
    /// In explicit delivery modes the subscription is also recorded with the
    /// subscription manager; a failure there rolls back the pub-sub registration.
    pub async fn subscribe(
        &self,
        observer: Arc<dyn StreamObserver<T>>,
    ) -> Result<StreamSubscriptionHandle, ProviderError> {
        let pub_sub = self.require_pub_sub()?;
        let stream = self.stream.identity();
        let subscription_id = SubscriptionId::new();

        let sink = Arc::new(ObserverSink {
            stream: stream.clone(),
            observer,
        });

        if let Err(err) = pub_sub
            .register_consumer(stream, subscription_id, sink)
            .await
        {
            warn!(
                event = events::CONSUMER_SUBSCRIBE_FAILED,
                component = COMPONENT,
                stream = %stream,
                err = %err,
                "pub-sub rejected consumer registration"
            );
            return Err(err.into());
        }

        if let Some(manager) = self.subscription_manager.as_ref() {
            if let Err(err) = manager
                .add_subscription(
                    stream.provider_name(),
                    stream,
                    subscription_id,
                    &subscription_id.to_string(),
                )
                .await
            {
                warn!(
                    event = events::CONSUMER_SUBSCRIBE_FAILED,
                    component = COMPONENT,
                    stream = %stream,
                    subscription_id = %subscription_id,
                    err = %err,
                    "subscription manager rejected subscription, rolling back"
                );
                if let Err(rollback_err) =
                    pub_sub.unregister_consumer(stream, subscription_id).await
                {
                    warn!(
                        event = events::CONSUMER_UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        stream = %stream,
                        subscription_id = %subscription_id,
                        err = %rollback_err,
                        "rollback of consumer registration failed"
                    );
                }
                return Err(err.into());
            }
        }

        info!(
            event = events::CONSUMER_SUBSCRIBE_OK,
            component = COMPONENT,
            stream = %stream,
            subscription_id = %subscription_id,
            "consumer subscribed"
        );

        Ok(StreamSubscriptionHandle {
            subscription_id,
            stream: stream.clone(),
        })
    }

    /// Removes a subscription previously created on this stream.
    ///
    /// The explicit subscription record goes first. If the pub-sub backend then
    /// refuses the removal, the record is restored so both backends keep
    /// agreeing on the subscription.
    pub async fn unsubscribe(
        &self,
        handle: &StreamSubscriptionHandle,
    ) -> Result<(), ProviderError> {
        let pub_sub = self.require_pub_sub()?;
        let stream = self.stream.identity();
        let subscription_id = handle.subscription_id();

        if handle.stream() != stream {
            return Err(DeliveryError::new(
                DeliveryErrorKind::NotFound,
                format!(
                    "subscription {subscription_id} belongs to stream {}, not {stream}",
                    handle.stream()
                ),
            )
            .into());
        }

        if let Some(manager) = self.subscription_manager.as_ref() {
            manager
                .remove_subscription(stream.provider_name(), stream, subscription_id)
                .await
                .inspect_err(|err| {
                    warn!(
                        event = events::CONSUMER_UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        stream = %stream,
                        subscription_id = %subscription_id,
                        err = %err,
                        "subscription manager rejected subscription removal"
                    )
                })?;
        }

        if let Err(err) = pub_sub.unregister_consumer(stream, subscription_id).await {
            warn!(
                event = events::CONSUMER_UNSUBSCRIBE_FAILED,
                component = COMPONENT,
                stream = %stream,
                subscription_id = %subscription_id,
                err = %err,
                "pub-sub rejected consumer removal, restoring subscription record"
            );
            if let Some(manager) = self.subscription_manager.as_ref() {
                let provider = stream.provider_name();
                let subscriber = subscription_id.to_string();
                if let Err(restore_err) = manager
                    .add_subscription(provider, stream, subscription_id, &subscriber)
                    .await
                {
                    warn!(
                        event = events::CONSUMER_UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        stream = %stream,
                        subscription_id = %subscription_id,
                        err = %restore_err,
                        "restoring subscription record failed"
                    );
                }
            }
            return Err(err.into());
        }

        info!(
            event = events::CONSUMER_UNSUBSCRIBE_OK,
            component = COMPONENT,
            stream = %stream,
            subscription_id = %subscription_id,
            "consumer unsubscribed"
        );
        Ok(())
    }

    /// Every subscription the pub-sub backend currently holds for this stream.
    pub async fn all_subscriptions(&self) -> Result<Vec<StreamSubscriptionHandle>, ProviderError> {
        let pub_sub = self.require_pub_sub()?;
        let stream = self.stream.identity();

        let mut subscription_ids = pub_sub.consumer_subscriptions(stream).await?;
        subscription_ids.sort_unstable();

        Ok(subscription_ids
            .into_iter()
            .map(|subscription_id| StreamSubscriptionHandle {
                subscription_id,
                stream: stream.clone(),
            })
            .collect())
    }
}

impl<T> Debug for ConsumerEndpoint<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerEndpoint")
            .field("stream", self.stream.identity())
            .field("pub_sub", &self.pub_sub.is_some())
            .field("subscription_manager", &self.subscription_manager.is_some())
            .finish()
    }
}
