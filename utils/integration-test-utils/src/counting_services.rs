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

use message_stream_provider::{
    CloneSerializer, DeliveryMode, LoggerFactory, RuntimeServices, ServiceLocator, StreamItem,
    StreamPubSub, StreamSerializer, SubscriptionManagerRegistry, TracingLoggerFactory,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Clone-based serializer counting the copies it makes.
#[derive(Default)]
pub struct CountingSerializer {
    copies: AtomicUsize,
}

impl CountingSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_count(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }
}

impl StreamSerializer for CountingSerializer {
    fn deep_copy(&self, item: &StreamItem) -> StreamItem {
        self.copies.fetch_add(1, Ordering::SeqCst);
        CloneSerializer.deep_copy(item)
    }
}

/// Service locator counting every resolution made through it.
pub struct CountingServiceLocator {
    services: RuntimeServices,
    resolutions: AtomicUsize,
}

impl CountingServiceLocator {
    pub fn new(services: RuntimeServices) -> Self {
        Self {
            services,
            resolutions: AtomicUsize::new(0),
        }
    }

    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
    }
}

impl ServiceLocator for CountingServiceLocator {
    fn serializer(&self) -> Option<Arc<dyn StreamSerializer>> {
        self.count();
        self.services.serializer()
    }

    fn logger_factory(&self) -> Option<Arc<dyn LoggerFactory>> {
        self.count();
        self.services.logger_factory()
    }

    fn subscription_manager_registry(&self) -> Option<Arc<dyn SubscriptionManagerRegistry>> {
        self.count();
        self.services.subscription_manager_registry()
    }

    fn pub_sub(&self, delivery_mode: DeliveryMode) -> Option<Arc<dyn StreamPubSub>> {
        self.count();
        self.services.pub_sub(delivery_mode)
    }
}

/// Bundle with the clone serializer and tracing logger factory registered.
pub fn base_runtime_services() -> RuntimeServices {
    RuntimeServices::new()
        .with_serializer(Arc::new(CloneSerializer))
        .with_logger_factory(Arc::new(TracingLoggerFactory))
}

/// Bundle serving `pub_sub` for every delivery mode that has one, plus the
/// explicit subscription manager `registry`.
pub fn runtime_services_with(
    serializer: Arc<dyn StreamSerializer>,
    pub_sub: Arc<dyn StreamPubSub>,
    registry: Arc<dyn SubscriptionManagerRegistry>,
) -> RuntimeServices {
    DeliveryMode::ALL
        .into_iter()
        .fold(
            RuntimeServices::new()
                .with_serializer(serializer)
                .with_logger_factory(Arc::new(TracingLoggerFactory))
                .with_subscription_manager_registry(registry),
            |services, mode| services.with_pub_sub(mode, pub_sub.clone()),
        )
}
