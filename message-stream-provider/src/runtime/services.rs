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

//! Shared singleton services resolved by a provider during init.

use crate::delivery_mode::DeliveryMode;
use crate::runtime::pub_sub::StreamPubSub;
use crate::runtime::stream_item::StreamItem;
use crate::runtime::subscription_manager::SubscriptionManagerRegistry;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::Span;

pub const SERIALIZER_SERVICE: &str = "serializer";
pub const LOGGER_FACTORY_SERVICE: &str = "logger factory";
pub const SUBSCRIPTION_MANAGER_REGISTRY_SERVICE: &str = "subscription manager registry";
pub const SUBSCRIPTION_MANAGER_SERVICE: &str = "explicit-subscribe-only subscription manager";
pub const PUB_SUB_SERVICE: &str = "stream pub-sub";

/// Produces defensive copies of published items.
pub trait StreamSerializer: Send + Sync {
    fn deep_copy(&self, item: &StreamItem) -> StreamItem;
}

/// Copies items through their `Clone` implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloneSerializer;

impl StreamSerializer for CloneSerializer {
    fn deep_copy(&self, item: &StreamItem) -> StreamItem {
        item.deep_copy()
    }
}

/// Creates the span a component emits its events in.
pub trait LoggerFactory: Send + Sync {
    fn create_logger(&self, category: &str) -> Span;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLoggerFactory;

impl LoggerFactory for TracingLoggerFactory {
    fn create_logger(&self, category: &str) -> Span {
        tracing::info_span!("logger", category)
    }
}

/// Required-service resolution for provider init.
///
/// Every lookup returns `None` when the service is not registered; the provider
/// turns that into a missing-dependency error.
pub trait ServiceLocator: Send + Sync {
    fn serializer(&self) -> Option<Arc<dyn StreamSerializer>>;

    fn logger_factory(&self) -> Option<Arc<dyn LoggerFactory>>;

    fn subscription_manager_registry(&self) -> Option<Arc<dyn SubscriptionManagerRegistry>>;

    fn pub_sub(&self, delivery_mode: DeliveryMode) -> Option<Arc<dyn StreamPubSub>>;
}

/// Context bundle of the services a provider depends on.
///
/// ```
/// use std::sync::Arc;
/// use message_stream_provider::{
///     CloneSerializer, RuntimeServices, ServiceLocator, TracingLoggerFactory,
/// };
///
/// let services = RuntimeServices::new()
///     .with_serializer(Arc::new(CloneSerializer))
///     .with_logger_factory(Arc::new(TracingLoggerFactory));
///
/// assert!(services.serializer().is_some());
/// assert!(services.subscription_manager_registry().is_none());
/// ```
#[derive(Clone, Default)]
pub struct RuntimeServices {
    serializer: Option<Arc<dyn StreamSerializer>>,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
    subscription_manager_registry: Option<Arc<dyn SubscriptionManagerRegistry>>,
    pub_sub: HashMap<DeliveryMode, Arc<dyn StreamPubSub>>,
}

impl RuntimeServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn StreamSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn with_logger_factory(mut self, logger_factory: Arc<dyn LoggerFactory>) -> Self {
        self.logger_factory = Some(logger_factory);
        self
    }

    pub fn with_subscription_manager_registry(
        mut self,
        registry: Arc<dyn SubscriptionManagerRegistry>,
    ) -> Self {
        self.subscription_manager_registry = Some(registry);
        self
    }

    /// Registers `backend` for `delivery_mode`. [`DeliveryMode::None`] is ignored.
    pub fn with_pub_sub(
        mut self,
        delivery_mode: DeliveryMode,
        backend: Arc<dyn StreamPubSub>,
    ) -> Self {
        if delivery_mode.has_pub_sub() {
            self.pub_sub.insert(delivery_mode, backend);
        }
        self
    }
}

impl ServiceLocator for RuntimeServices {
    fn serializer(&self) -> Option<Arc<dyn StreamSerializer>> {
        self.serializer.clone()
    }

    fn logger_factory(&self) -> Option<Arc<dyn LoggerFactory>> {
        self.logger_factory.clone()
    }

    fn subscription_manager_registry(&self) -> Option<Arc<dyn SubscriptionManagerRegistry>> {
        self.subscription_manager_registry.clone()
    }

    fn pub_sub(&self, delivery_mode: DeliveryMode) -> Option<Arc<dyn StreamPubSub>> {
        self.pub_sub.get(&delivery_mode).cloned()
    }
}

impl Debug for RuntimeServices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut pub_sub_modes: Vec<_> = self.pub_sub.keys().map(DeliveryMode::as_str).collect();
        pub_sub_modes.sort_unstable();

        f.debug_struct("RuntimeServices")
            .field("serializer", &self.serializer.is_some())
            .field("logger_factory", &self.logger_factory.is_some())
            .field(
                "subscription_manager_registry",
                &self.subscription_manager_registry.is_some(),
            )
            .field("pub_sub", &pub_sub_modes)
            .finish()
    }
}
