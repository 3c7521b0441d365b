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

use crate::routing::stream_identity::StreamIdentity;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

///
/// [`StreamHandle`] is the single in-process object representing one logical stream.
///
/// Handles are created by the [`StreamDirectory`](crate::StreamDirectory) and shared as
/// `Arc<StreamHandle<T>>` by every producer and consumer of the same
/// [`StreamIdentity`]. The rewindable flag is fixed at construction.
///
/// # Examples
///
/// ```
/// use message_stream_provider::{StreamDirectory, StreamHandle, StreamIdentity};
/// use uuid::Uuid;
///
/// let directory = StreamDirectory::new();
/// let identity = StreamIdentity::new(Uuid::new_v4(), "sms", "orders");
///
/// let handle = directory
///     .get_or_create(identity.clone(), || StreamHandle::<u64>::new(identity.clone(), false))
///     .unwrap();
///
/// assert_eq!(handle.identity(), &identity);
/// assert!(!handle.is_rewindable());
/// ```
pub struct StreamHandle<T> {
    identity: StreamIdentity,
    is_rewindable: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T> StreamHandle<T> {
    pub fn new(identity: StreamIdentity, is_rewindable: bool) -> Self {
        Self {
            identity,
            is_rewindable,
            _item: PhantomData,
        }
    }

    pub fn identity(&self) -> &StreamIdentity {
        &self.identity
    }

    pub fn is_rewindable(&self) -> bool {
        self.is_rewindable
    }

    pub fn provider_name(&self) -> &str {
        self.identity.provider_name()
    }

    pub fn namespace(&self) -> &str {
        self.identity.namespace()
    }
}

impl<T> Debug for StreamHandle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("identity", &self.identity)
            .field("is_rewindable", &self.is_rewindable)
            .field("item_type", &std::any::type_name::<T>())
            .finish()
    }
}
