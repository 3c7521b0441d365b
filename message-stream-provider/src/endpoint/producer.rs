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

//! Producer endpoint publishing typed items onto one stream.

use crate::error::ProviderError;
use crate::observability::events;
use crate::routing::stream_identity::StreamIdentity;
use crate::runtime::pub_sub::StreamPubSub;
use crate::runtime::services::StreamSerializer;
use crate::runtime::stream_item::{StreamEvent, StreamItem};
use crate::stream_handle::StreamHandle;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::SendError};
use tracing::{debug, warn};

const COMPONENT: &str = "producer_endpoint";

/// Sole gateway for publishing items of type `T` onto a stream.
pub struct ProducerEndpoint<T> {
    stream: Arc<StreamHandle<T>>,
    fire_and_forget_delivery: bool,
    optimize_for_immutable_data: bool,
    pub_sub: Option<Arc<dyn StreamPubSub>>,
    serializer: Arc<dyn StreamSerializer>,
    dispatch: Option<OrderedDispatch>,
}

impl<T> ProducerEndpoint<T>
where
    T: Any + Clone + Send + Sync,
{
    pub(crate) fn new(
        stream: Arc<StreamHandle<T>>,
        fire_and_forget_delivery: bool,
        optimize_for_immutable_data: bool,
        pub_sub: Option<Arc<dyn StreamPubSub>>,
        serializer: Arc<dyn StreamSerializer>,
    ) -> Self {
        let dispatch = fire_and_forget_delivery.then(OrderedDispatch::new);
        Self {
            stream,
            fire_and_forget_delivery,
            optimize_for_immutable_data,
            pub_sub,
            serializer,
            dispatch,
        }
    }

    pub fn stream(&self) -> &Arc<StreamHandle<T>> {
        &self.stream
    }

    pub fn fire_and_forget_delivery(&self) -> bool {
        self.fire_and_forget_delivery
    }

    pub fn optimize_for_immutable_data(&self) -> bool {
        self.optimize_for_immutable_data
    }

    pub fn is_rewindable(&self) -> bool {
        self.stream.is_rewindable()
    }

    /// Pub-sub backend this producer publishes through.
    pub fn pub_sub(&self) -> Option<&Arc<dyn StreamPubSub>> {
        self.pub_sub.as_ref()
    }

    /// Publishes one item.
    ///
    /// With fire-and-forget delivery this returns once the item is queued,
    /// without waiting for the backend to acknowledge it. Queued events still
    /// reach the backend in the order this producer sent them.
    pub async fn on_next(&self, item: impl Into<Arc<T>>) -> Result<(), ProviderError> {
        let item = self.prepare_item(item.into());
        self.send(StreamEvent::Item(item)).await
    }

    /// Publishes items in order, stopping at the first failure.
    pub async fn on_next_batch(
        &self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), ProviderError> {
        for item in items {
            self.on_next(item).await?;
        }
        Ok(())
    }

    pub async fn on_completed(&self) -> Result<(), ProviderError> {
        self.send(StreamEvent::Completed).await
    }

    pub async fn on_error(&self, message: impl Into<String>) -> Result<(), ProviderError> {
        self.send(StreamEvent::Error(message.into())).await
    }

    fn prepare_item(&self, item: Arc<T>) -> StreamItem {
        if self.optimize_for_immutable_data {
            StreamItem::shared(item)
        } else {
            self.serializer.deep_copy(&StreamItem::copied(item))
        }
    }

    async fn send(&self, event: StreamEvent) -> Result<(), ProviderError> {
        let stream = self.stream.identity();

        let Some(pub_sub) = self.pub_sub.as_ref() else {
            debug!(
                event = events::PRODUCER_SEND_DROPPED,
                component = COMPONENT,
                stream = %stream,
                "no pub-sub backend for this delivery mode, dropping event"
            );
            return Ok(());
        };

        debug!(
            event = events::PRODUCER_SEND_ATTEMPT,
            component = COMPONENT,
            stream = %stream,
            fire_and_forget = self.fire_and_forget_delivery,
            "publishing stream event"
        );

        if let Some(dispatch) = self.dispatch.as_ref() {
            if let Err(event) = dispatch.dispatch(pub_sub, stream, event) {
                publish_unacknowledged(pub_sub.as_ref(), stream, event).await;
            }
            return Ok(());
        }

        match pub_sub.publish(stream, event).await {
            Ok(()) => {
                debug!(
                    event = events::PRODUCER_SEND_OK,
                    component = COMPONENT,
                    stream = %stream,
                    "stream event acknowledged"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::PRODUCER_SEND_FAILED,
                    component = COMPONENT,
                    stream = %stream,
                    err = %err,
                    "publish failed"
                );
                Err(err.into())
            }
        }
    }
}

/// Queue feeding one drain task, so fire-and-forget events keep their order.
struct OrderedDispatch {
    sender: mpsc::UnboundedSender<StreamEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<StreamEvent>>>,
}

impl OrderedDispatch {
    fn new() -> Self {
        let (sender, rx) = mpsc::unbounded_channel();
        Self {
            sender,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Queues `event`, starting the drain task on first use.
    ///
    /// Hands the event back when no tokio runtime can drain the queue.
    fn dispatch(
        &self,
        pub_sub: &Arc<dyn StreamPubSub>,
        stream: &StreamIdentity,
        event: StreamEvent,
    ) -> Result<(), StreamEvent> {
        let mut idle = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(queue) = idle.take() {
            match Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(drain(pub_sub.clone(), stream.clone(), queue));
                }
                Err(_) => {
                    *idle = Some(queue);
                    return Err(event);
                }
            }
        }
        drop(idle);

        self.sender.send(event).map_err(|SendError(event)| event)
    }
}

async fn drain(
    pub_sub: Arc<dyn StreamPubSub>,
    stream: StreamIdentity,
    mut queue: mpsc::UnboundedReceiver<StreamEvent>,
) {
    while let Some(event) = queue.recv().await {
        publish_unacknowledged(pub_sub.as_ref(), &stream, event).await;
    }
}

async fn publish_unacknowledged(
    pub_sub: &dyn StreamPubSub,
    stream: &StreamIdentity,
    event: StreamEvent,
) {
    if let Err(err) = pub_sub.publish(stream, event).await {
        warn!(
            event = events::PRODUCER_SEND_FAILED,
            component = COMPONENT,
            stream = %stream,
            err = %err,
            "fire-and-forget publish failed"
        );
    }
}

impl<T> Debug for ProducerEndpoint<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerEndpoint")
            .field("stream", self.stream.identity())
            .field("fire_and_forget_delivery", &self.fire_and_forget_delivery)
            .field(
                "optimize_for_immutable_data",
                &self.optimize_for_immutable_data,
            )
            .field("pub_sub", &self.pub_sub.is_some())
            .finish()
    }
}
