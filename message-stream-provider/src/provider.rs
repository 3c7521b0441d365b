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

//! Named stream provider: lifecycle, stream resolution, and endpoint construction.

use crate::config::{ConfigSource, ProviderConfig};
use crate::endpoint::consumer::ConsumerEndpoint;
use crate::endpoint::producer::ProducerEndpoint;
use crate::error::ProviderError;
use crate::lifecycle::provider_state::ProviderState;
use crate::lifecycle::state_manager::ProviderStateManager;
use crate::observability::{events, fields};
use crate::routing::stream_directory::StreamDirectory;
use crate::routing::stream_identity::StreamIdentity;
use crate::runtime::pub_sub::StreamPubSub;
use crate::runtime::services::{
    ServiceLocator, StreamSerializer, LOGGER_FACTORY_SERVICE, PUB_SUB_SERVICE, SERIALIZER_SERVICE,
    SUBSCRIPTION_MANAGER_REGISTRY_SERVICE, SUBSCRIPTION_MANAGER_SERVICE,
};
use crate::runtime::subscription_manager::{StreamSubscriptionManager, SubscriptionManagerType};
use crate::stream_handle::StreamHandle;
use arc_swap::ArcSwapOption;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info, warn, Span};
use uuid::Uuid;

const COMPONENT: &str = "provider";

/// Streams served by this provider cannot be replayed.
const IS_REWINDABLE: bool = false;

/// Everything a committed init resolved, published as one unit.
struct ProviderRuntime {
    config: Arc<ProviderConfig>,
    serializer: Arc<dyn StreamSerializer>,
    pub_sub: Option<Arc<dyn StreamPubSub>>,
    subscription_manager: Option<Arc<dyn StreamSubscriptionManager>>,
    span: Span,
}

///
/// [`MessageStreamProvider`] serves typed streams under one provider name.
///
/// A provider moves through `Uninitialized -> Initialized -> Started -> Closed`.
/// Lifecycle calls that arrive out of order, or at or past the committed state,
/// succeed without doing anything. Streams can be resolved in every phase after a
/// committed [`init`](Self::init), including after [`close`](Self::close).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use message_stream_provider::{
///     CloneSerializer, DeliveryMode, MessageStreamProvider, ProviderConfiguration,
///     ProviderState, RuntimeServices, StreamDirectory, TracingLoggerFactory, DELIVERY_MODE,
/// };
/// use uuid::Uuid;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let services = RuntimeServices::new()
///     .with_serializer(Arc::new(CloneSerializer))
///     .with_logger_factory(Arc::new(TracingLoggerFactory));
/// let config = ProviderConfiguration::new().with_property(DELIVERY_MODE, "None");
///
/// let provider = MessageStreamProvider::new(Arc::new(StreamDirectory::new()));
/// provider.init("sms", &services, &config).await.unwrap();
/// provider.start().await.unwrap();
///
/// let stream = provider.get_stream::<String>(Uuid::new_v4(), "orders").unwrap();
/// assert_eq!(stream.provider_name(), "sms");
/// assert_eq!(provider.state(), ProviderState::Started);
/// assert_eq!(provider.config().unwrap().delivery_mode(), DeliveryMode::None);
/// # });
/// ```
pub struct MessageStreamProvider {
    directory: Arc<StreamDirectory>,
    state: ProviderStateManager,
    runtime: ArcSwapOption<ProviderRuntime>,
}

impl MessageStreamProvider {
    /// Creates an uninitialized provider resolving streams through `directory`.
    pub fn new(directory: Arc<StreamDirectory>) -> Self {
        Self {
            directory,
            state: ProviderStateManager::new(),
            runtime: ArcSwapOption::empty(),
        }
    }

    pub fn state(&self) -> ProviderState {
        self.state.state()
    }

    /// Provider name fixed by the committed init.
    pub fn name(&self) -> Option<String> {
        self.runtime
            .load_full()
            .map(|runtime| runtime.config.name().to_string())
    }

    /// Configuration fixed by the committed init.
    pub fn config(&self) -> Option<Arc<ProviderConfig>> {
        self.runtime
            .load_full()
            .map(|runtime| runtime.config.clone())
    }

    pub fn is_rewindable(&self) -> bool {
        IS_REWINDABLE
    }

    pub fn directory(&self) -> &Arc<StreamDirectory> {
        &self.directory
    }

    /// Validates `config`, resolves the required services, and commits the
    /// provider as initialized.
    ///
    /// On failure nothing is committed and init can be retried. Once committed,
    /// further calls return `Ok(())` without resolving anything.
    pub async fn init(
        &self,
        name: &str,
        services: &dyn ServiceLocator,
        config: &dyn ConfigSource,
    ) -> Result<(), ProviderError> {
        let Some(pending) = self.state.request_state(ProviderState::Initialized) else {
            self.log_skipped(ProviderState::Initialized);
            return Ok(());
        };

        debug!(
            event = events::PROVIDER_INIT_START,
            component = COMPONENT,
            provider = name,
            "initializing provider"
        );

        let runtime = match Self::resolve_runtime(name, services, config).await {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(
                    event = events::PROVIDER_INIT_FAILED,
                    component = COMPONENT,
                    provider = name,
                    err = %err,
                    "provider init failed, state left uninitialized"
                );
                return Err(err);
            }
        };

        runtime.span.in_scope(|| {
            info!(
                event = events::PROVIDER_INIT_OK,
                component = COMPONENT,
                provider = name,
                fire_and_forget_delivery = runtime.config.fire_and_forget_delivery(),
                optimize_for_immutable_data = runtime.config.optimize_for_immutable_data(),
                delivery_mode = %runtime.config.delivery_mode(),
                "initialized provider"
            )
        });

        // Published before the committed state so readers of Initialized see it.
        self.runtime.store(Some(Arc::new(runtime)));
        pending.commit_state();
        Ok(())
    }

    async fn resolve_runtime(
        name: &str,
        services: &dyn ServiceLocator,
        config: &dyn ConfigSource,
    ) -> Result<ProviderRuntime, ProviderError> {
        let config = ProviderConfig::from_source(name, config)?;

        let serializer = services
            .serializer()
            .ok_or(ProviderError::MissingDependency {
                service: SERIALIZER_SERVICE,
            })?;
        let logger_factory = services
            .logger_factory()
            .ok_or(ProviderError::MissingDependency {
                service: LOGGER_FACTORY_SERVICE,
            })?;

        let delivery_mode = config.delivery_mode();
        let pub_sub = if delivery_mode.has_pub_sub() {
            Some(
                services
                    .pub_sub(delivery_mode)
                    .ok_or(ProviderError::MissingDependency {
                        service: PUB_SUB_SERVICE,
                    })?,
            )
        } else {
            None
        };

        let subscription_manager = if delivery_mode.requires_explicit_subscriptions() {
            let registry = services
                .subscription_manager_registry()
                .ok_or(ProviderError::MissingDependency {
                    service: SUBSCRIPTION_MANAGER_REGISTRY_SERVICE,
                })?;
            let manager = registry
                .stream_subscription_manager(SubscriptionManagerType::ExplicitSubscribeOnly)
                .await
                .ok_or(ProviderError::MissingDependency {
                    service: SUBSCRIPTION_MANAGER_SERVICE,
                })?;
            Some(manager)
        } else {
            None
        };

        let span = logger_factory.create_logger(fields::PROVIDER_LOGGER_CATEGORY);

        Ok(ProviderRuntime {
            config: Arc::new(config),
            serializer,
            pub_sub,
            subscription_manager,
            span,
        })
    }

    /// Moves an initialized provider to started. A no-op in any other state.
    pub async fn start(&self) -> Result<(), ProviderError> {
        self.transition(ProviderState::Started, events::PROVIDER_START_OK);
        Ok(())
    }

    /// Moves an initialized or started provider to closed. Closed is terminal.
    pub async fn close(&self) -> Result<(), ProviderError> {
        self.transition(ProviderState::Closed, events::PROVIDER_CLOSE_OK);
        Ok(())
    }

    fn transition(&self, target: ProviderState, event: &'static str) {
        let Some(pending) = self.state.request_state(target) else {
            self.log_skipped(target);
            return;
        };
        pending.commit_state();

        let runtime = self.runtime.load_full();
        let span = runtime
            .as_ref()
            .map(|runtime| runtime.span.clone())
            .unwrap_or_else(Span::none);
        span.in_scope(|| {
            info!(
                event = event,
                component = COMPONENT,
                provider = %fields::format_provider_name(
                    runtime.as_ref().map(|runtime| runtime.config.name())
                ),
                state = %target,
                "provider state committed"
            )
        });
    }

    fn log_skipped(&self, requested: ProviderState) {
        debug!(
            event = events::PROVIDER_TRANSITION_SKIPPED,
            component = COMPONENT,
            provider = %fields::format_provider_name(self.name().as_deref()),
            requested = %requested,
            state = %self.state.state(),
            "lifecycle transition not applicable, ignoring"
        );
    }

    fn committed_runtime(&self) -> Result<Arc<ProviderRuntime>, ProviderError> {
        self.runtime.load_full().ok_or_else(|| {
            debug!(
                event = events::STREAM_RESOLVE_NOT_INITIALIZED,
                component = COMPONENT,
                state = %self.state.state(),
                "provider has no committed configuration"
            );
            ProviderError::NotInitialized
        })
    }

    /// Resolves the shared handle of stream `guid` in `namespace`.
    ///
    /// Concurrent callers asking for the same stream all receive the same `Arc`.
    pub fn get_stream<T>(
        &self,
        guid: Uuid,
        namespace: &str,
    ) -> Result<Arc<StreamHandle<T>>, ProviderError>
    where
        T: Any + Send + Sync,
    {
        let runtime = self.committed_runtime()?;
        let identity = StreamIdentity::new(guid, runtime.config.name(), namespace);

        let handle = self.directory.get_or_create(identity.clone(), move || {
            StreamHandle::new(identity, IS_REWINDABLE)
        })?;
        Ok(handle)
    }

    /// Builds a producer for `stream` bound to the committed delivery policy.
    pub fn producer_interface<T>(
        &self,
        stream: &Arc<StreamHandle<T>>,
    ) -> Result<ProducerEndpoint<T>, ProviderError>
    where
        T: Any + Clone + Send + Sync,
    {
        let runtime = self.committed_runtime()?;

        Ok(ProducerEndpoint::new(
            stream.clone(),
            runtime.config.fire_and_forget_delivery(),
            runtime.config.optimize_for_immutable_data(),
            runtime.pub_sub.clone(),
            runtime.serializer.clone(),
        ))
    }

    /// Builds a consumer for `stream` bound to the committed delivery backends.
    pub fn consumer_interface<T>(
        &self,
        stream: &Arc<StreamHandle<T>>,
    ) -> Result<ConsumerEndpoint<T>, ProviderError>
    where
        T: Any + Send + Sync,
    {
        let runtime = self.committed_runtime()?;

        Ok(ConsumerEndpoint::new(
            stream.clone(),
            runtime.pub_sub.clone(),
            runtime.subscription_manager.clone(),
        ))
    }

    /// Explicit subscription manager retained by init, if the delivery mode uses one.
    pub fn subscription_manager(&self) -> Option<Arc<dyn StreamSubscriptionManager>> {
        self.runtime
            .load_full()
            .and_then(|runtime| runtime.subscription_manager.clone())
    }
}

impl Debug for MessageStreamProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStreamProvider")
            .field("name", &self.name())
            .field("state", &self.state.state())
            .field("config", &self.config())
            .field("directory", &self.directory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageStreamProvider;
    use crate::config::{ProviderConfiguration, DELIVERY_MODE, FIRE_AND_FORGET_DELIVERY};
    use crate::delivery_mode::DeliveryMode;
    use crate::error::{DeliveryError, ProviderError};
    use crate::lifecycle::provider_state::ProviderState;
    use crate::routing::stream_directory::StreamDirectory;
    use crate::routing::stream_identity::StreamIdentity;
    use crate::runtime::pub_sub::{StreamPubSub, StreamSink, SubscriptionId};
    use crate::runtime::services::{
        CloneSerializer, RuntimeServices, TracingLoggerFactory, PUB_SUB_SERVICE,
        SUBSCRIPTION_MANAGER_REGISTRY_SERVICE,
    };
    use crate::runtime::stream_item::StreamEvent;
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    struct NullPubSub;

    #[async_trait]
    impl StreamPubSub for NullPubSub {
        async fn register_consumer(
            &self,
            _stream: &StreamIdentity,
            _subscription_id: SubscriptionId,
            _sink: Arc<dyn StreamSink>,
        ) -> Result<(), DeliveryError> {
            Ok(())
        }

        async fn unregister_consumer(
            &self,
            _stream: &StreamIdentity,
            _subscription_id: SubscriptionId,
        ) -> Result<(), DeliveryError> {
            Ok(())
        }

        async fn consumer_subscriptions(
            &self,
            _stream: &StreamIdentity,
        ) -> Result<Vec<SubscriptionId>, DeliveryError> {
            Ok(Vec::new())
        }

        async fn publish(
            &self,
            _stream: &StreamIdentity,
            _event: StreamEvent,
        ) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn base_services() -> RuntimeServices {
        RuntimeServices::new()
            .with_serializer(Arc::new(CloneSerializer))
            .with_logger_factory(Arc::new(TracingLoggerFactory))
    }

    fn provider() -> MessageStreamProvider {
        MessageStreamProvider::new(Arc::new(StreamDirectory::new()))
    }

    #[tokio::test]
    async fn lifecycle_walks_forward_and_closed_is_terminal() {
        let provider = provider();
        let services = base_services();
        let config = ProviderConfiguration::new().with_property(DELIVERY_MODE, "None");

        provider.start().await.unwrap();
        assert_eq!(provider.state(), ProviderState::Uninitialized);

        provider.init("sms", &services, &config).await.unwrap();
        provider.start().await.unwrap();
        provider.close().await.unwrap();
        provider.init("sms", &services, &config).await.unwrap();
        provider.start().await.unwrap();

        assert_eq!(provider.state(), ProviderState::Closed);
        assert_eq!(provider.name().as_deref(), Some("sms"));
    }

    #[tokio::test]
    async fn missing_pub_sub_is_reported_and_not_committed() {
        let provider = provider();
        let services = base_services();
        let config = ProviderConfiguration::new().with_property(DELIVERY_MODE, "ImplicitOnly");

        let err = provider.init("sms", &services, &config).await.unwrap_err();

        assert!(matches!(
            err,
            ProviderError::MissingDependency {
                service: PUB_SUB_SERVICE
            }
        ));
        assert_eq!(provider.state(), ProviderState::Uninitialized);
        assert!(provider.config().is_none());
    }

    #[tokio::test]
    async fn explicit_mode_requires_the_registry() {
        let provider = provider();
        let services =
            base_services().with_pub_sub(DeliveryMode::ExplicitOnly, Arc::new(NullPubSub));
        let config = ProviderConfiguration::new().with_property(DELIVERY_MODE, "ExplicitOnly");

        let err = provider.init("sms", &services, &config).await.unwrap_err();

        assert!(matches!(
            err,
            ProviderError::MissingDependency {
                service: SUBSCRIPTION_MANAGER_REGISTRY_SERVICE
            }
        ));
        assert_eq!(provider.state(), ProviderState::Uninitialized);
    }

    #[tokio::test]
    async fn invalid_flag_fails_init() {
        let provider = provider();
        let services = base_services();
        let config = ProviderConfiguration::new()
            .with_property(DELIVERY_MODE, "None")
            .with_property(FIRE_AND_FORGET_DELIVERY, "sometimes");

        let err = provider.init("sms", &services, &config).await.unwrap_err();

        assert!(matches!(err, ProviderError::Configuration(_)));
        assert_eq!(provider.state(), ProviderState::Uninitialized);
    }

    #[test]
    fn get_stream_before_init_is_rejected() {
        let provider = provider();

        let result = provider.get_stream::<String>(Uuid::new_v4(), "orders");

        assert!(matches!(result, Err(ProviderError::NotInitialized)));
        assert!(provider.directory().is_empty());
        assert!(provider.subscription_manager().is_none());
        assert!(!provider.is_rewindable());
    }

    #[tokio::test]
    async fn streams_resolve_after_close() {
        let provider = provider();
        let services = base_services();
        let config = ProviderConfiguration::new().with_property(DELIVERY_MODE, "None");
        provider.init("sms", &services, &config).await.unwrap();
        provider.close().await.unwrap();

        let guid = Uuid::new_v4();
        let first = provider.get_stream::<u64>(guid, "orders").unwrap();
        let second = provider.get_stream::<u64>(guid, "orders").unwrap();

        let expected = StreamIdentity::new(guid, "sms", "orders");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.identity(), &expected);
        assert!(!first.is_rewindable());
    }
}
