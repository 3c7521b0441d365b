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

mod in_memory_pub_sub;
pub use in_memory_pub_sub::InMemoryPubSub;
mod in_memory_subscription_manager;
pub use in_memory_subscription_manager::{
    InMemorySubscriptionManager, InMemorySubscriptionManagerRegistry,
};
mod counting_services;
pub use counting_services::{
    base_runtime_services, runtime_services_with, CountingSerializer, CountingServiceLocator,
};
mod recording_observer;
pub use recording_observer::RecordingObserver;
mod logging;
pub use logging::init_logging;

/// Directory holding the json5 provider configurations used by the integration tests.
pub const STATIC_CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static-configs");

/// Path of the static configuration named `file_name`.
pub fn static_config_path(file_name: &str) -> std::path::PathBuf {
    std::path::Path::new(STATIC_CONFIG_DIR).join(file_name)
}
