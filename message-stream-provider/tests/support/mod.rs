#![allow(dead_code)]

use integration_test_utils::{
    init_logging, runtime_services_with, static_config_path, CountingSerializer, InMemoryPubSub,
    InMemorySubscriptionManager, InMemorySubscriptionManagerRegistry,
};
use message_stream_provider::{
    MessageStreamProvider, ProviderConfiguration, RuntimeServices, StreamDirectory,
};
use std::sync::Arc;

/// Collaborators backing one provider under test.
pub(crate) struct Harness {
    pub(crate) pub_sub: Arc<InMemoryPubSub>,
    pub(crate) serializer: Arc<CountingSerializer>,
    pub(crate) subscription_manager: Arc<InMemorySubscriptionManager>,
    pub(crate) registry: Arc<InMemorySubscriptionManagerRegistry>,
    pub(crate) services: RuntimeServices,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_parts(
            Arc::new(InMemoryPubSub::new()),
            Arc::new(InMemorySubscriptionManager::new()),
        )
    }

    pub(crate) fn with_parts(
        pub_sub: Arc<InMemoryPubSub>,
        subscription_manager: Arc<InMemorySubscriptionManager>,
    ) -> Self {
        init_logging();

        let serializer = Arc::new(CountingSerializer::new());
        let registry = Arc::new(InMemorySubscriptionManagerRegistry::new(
            subscription_manager.clone(),
        ));
        let services = runtime_services_with(serializer.clone(), pub_sub.clone(), registry.clone());

        Self {
            pub_sub,
            serializer,
            subscription_manager,
            registry,
            services,
        }
    }
}

pub(crate) fn make_provider() -> MessageStreamProvider {
    MessageStreamProvider::new(Arc::new(StreamDirectory::new()))
}

pub(crate) fn load_config(file_name: &str) -> ProviderConfiguration {
    ProviderConfiguration::from_json5_file(static_config_path(file_name))
        .expect("static config should load")
}

pub(crate) async fn init_ok(
    provider: &MessageStreamProvider,
    name: &str,
    harness: &Harness,
    config: &ProviderConfiguration,
) {
    provider
        .init(name, &harness.services, config)
        .await
        .expect("provider init should succeed");
}
