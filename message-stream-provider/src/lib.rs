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

//! # message-stream-provider
//!
//! `message-stream-provider` serves named, typed message streams to the actors of a
//! larger messaging runtime.
//!
//! A [`MessageStreamProvider`] owns a two-phase lifecycle, resolves stream identities to
//! one shared [`StreamHandle`] through an injected [`StreamDirectory`], and builds
//! [`ProducerEndpoint`]s and [`ConsumerEndpoint`]s bound to the pub-sub backend of the
//! configured [`DeliveryMode`]. Transport, queueing, and subscription persistence stay
//! behind the collaborator traits in this crate.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use message_stream_provider::{
//!     CloneSerializer, MessageStreamProvider, ProviderConfiguration, RuntimeServices,
//!     StreamDirectory, TracingLoggerFactory, DELIVERY_MODE, OPTIMIZE_FOR_IMMUTABLE_DATA,
//! };
//! use uuid::Uuid;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let directory = Arc::new(StreamDirectory::new());
//! let services = RuntimeServices::new()
//!     .with_serializer(Arc::new(CloneSerializer))
//!     .with_logger_factory(Arc::new(TracingLoggerFactory));
//! let config = ProviderConfiguration::new()
//!     .with_property(DELIVERY_MODE, "None")
//!     .with_property(OPTIMIZE_FOR_IMMUTABLE_DATA, false);
//!
//! let provider = MessageStreamProvider::new(directory.clone());
//! provider.init("sms", &services, &config).await.unwrap();
//!
//! let guid = Uuid::new_v4();
//! let stream = provider.get_stream::<String>(guid, "orders").unwrap();
//! let producer = provider.producer_interface(&stream).unwrap();
//!
//! assert!(!producer.optimize_for_immutable_data());
//! assert!(Arc::ptr_eq(&stream, &provider.get_stream::<String>(guid, "orders").unwrap()));
//! assert_eq!(directory.len(), 1);
//! # });
//! ```

mod config;
mod delivery_mode;
mod endpoint;
mod error;
mod lifecycle;
#[doc(hidden)]
pub mod observability;
mod provider;
mod routing;
mod runtime;
mod stream_handle;

pub use config::{
    ConfigSource, PropertyValue, ProviderConfig, ProviderConfiguration, DEFAULT_DELIVERY_MODE,
    DEFAULT_FIRE_AND_FORGET_DELIVERY, DEFAULT_OPTIMIZE_FOR_IMMUTABLE_DATA, DELIVERY_MODE,
    FIRE_AND_FORGET_DELIVERY, LEGACY_PUB_SUB_TYPE, OPTIMIZE_FOR_IMMUTABLE_DATA,
};
pub use delivery_mode::{DeliveryMode, DeliveryModeParseError};
pub use endpoint::consumer::{ConsumerEndpoint, StreamObserver, StreamSubscriptionHandle};
pub use endpoint::producer::ProducerEndpoint;
pub use error::{ConfigurationError, DeliveryError, DeliveryErrorKind, ProviderError};
pub use lifecycle::provider_state::ProviderState;
pub use lifecycle::state_manager::{PendingState, ProviderStateManager};
pub use provider::MessageStreamProvider;
pub use routing::stream_directory::{StreamDirectory, StreamTypeMismatch};
pub use routing::stream_identity::StreamIdentity;
pub use runtime::pub_sub::{StreamPubSub, StreamSink, SubscriptionId};
pub use runtime::services::{
    CloneSerializer, LoggerFactory, RuntimeServices, ServiceLocator, StreamSerializer,
    TracingLoggerFactory, LOGGER_FACTORY_SERVICE, PUB_SUB_SERVICE, SERIALIZER_SERVICE,
    SUBSCRIPTION_MANAGER_REGISTRY_SERVICE, SUBSCRIPTION_MANAGER_SERVICE,
};
pub use runtime::stream_item::{StreamEvent, StreamItem};
pub use runtime::subscription_manager::{
    StreamSubscription, StreamSubscriptionManager, SubscriptionManagerRegistry,
    SubscriptionManagerType,
};
pub use stream_handle::StreamHandle;
