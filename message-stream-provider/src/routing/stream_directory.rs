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

//! Process-wide identity-to-handle cache shared by stream providers.

use crate::observability::events;
use crate::routing::stream_identity::StreamIdentity;
use crate::stream_handle::StreamHandle;
use dashmap::DashMap;
use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "stream_directory";

type StoredHandle = Arc<dyn Any + Send + Sync>;

/// Directory entry exists but holds a handle of another item type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamTypeMismatch {
    pub identity: StreamIdentity,
    pub requested_type: &'static str,
}

impl Display for StreamTypeMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stream {} already exists with an item type other than {}",
            self.identity, self.requested_type
        )
    }
}

impl Error for StreamTypeMismatch {}

/// Concurrent map from [`StreamIdentity`] to the one shared [`StreamHandle`].
///
/// Owned by the runtime and injected into providers as `Arc<StreamDirectory>`.
/// Entries are never evicted by this type.
#[derive(Default)]
pub struct StreamDirectory {
    streams: DashMap<StreamIdentity, StoredHandle>,
}

impl StreamDirectory {
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// Returns the handle for `identity`, building it with `factory` if absent.
    ///
    /// Insert-if-absent runs under the entry's shard lock, so `factory` executes at
    /// most once per identity and every caller receives the same `Arc`.
    pub fn get_or_create<T, F>(
        &self,
        identity: StreamIdentity,
        factory: F,
    ) -> Result<Arc<StreamHandle<T>>, StreamTypeMismatch>
    where
        T: 'static,
        F: FnOnce() -> StreamHandle<T>,
    {
        // The read guard must be released before `entry` takes the shard write lock.
        let existing = self.streams.get(&identity).map(|e| e.value().clone());
        let stored = match existing {
            Some(existing) => existing,
            None => self.insert_if_absent(&identity, factory),
        };

        stored.downcast::<StreamHandle<T>>().map_err(|_| {
            let requested_type = std::any::type_name::<T>();
            warn!(
                event = events::STREAM_HANDLE_TYPE_MISMATCH,
                component = COMPONENT,
                stream = %identity,
                requested_type,
                "stream handle exists with a different item type"
            );
            StreamTypeMismatch {
                identity,
                requested_type,
            }
        })
    }

    fn insert_if_absent<T, F>(&self, identity: &StreamIdentity, factory: F) -> StoredHandle
    where
        T: 'static,
        F: FnOnce() -> StreamHandle<T>,
    {
        let entry = self.streams.entry(identity.clone()).or_insert_with(|| {
            debug!(
                event = events::STREAM_HANDLE_CREATE,
                component = COMPONENT,
                stream = %identity,
                "creating stream handle"
            );
            Arc::new(factory()) as StoredHandle
        });
        entry.value().clone()
    }

    pub fn contains(&self, identity: &StreamIdentity) -> bool {
        self.streams.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl Debug for StreamDirectory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDirectory")
            .field("streams", &self.streams.len())
            .finish()
    }
}
