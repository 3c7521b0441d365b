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

//! Type-erased items and events handed to pub-sub backends.

use crate::observability::events;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::warn;

const COMPONENT: &str = "stream_item";

type ErasedPayload = Arc<dyn Any + Send + Sync>;
type PayloadCopier = fn(&(dyn Any + Send + Sync)) -> Option<ErasedPayload>;

fn copy_payload<T>(payload: &(dyn Any + Send + Sync)) -> Option<ErasedPayload>
where
    T: Any + Clone + Send + Sync,
{
    payload
        .downcast_ref::<T>()
        .map(|value| Arc::new(value.clone()) as ErasedPayload)
}

/// One published item with its item type erased.
///
/// A shared item is handed to every fan-out target by reference. A non-shared item
/// is copied once per target by [`StreamItem::for_target`].
#[derive(Clone)]
pub struct StreamItem {
    payload: ErasedPayload,
    copier: PayloadCopier,
    shared: bool,
    type_name: &'static str,
}

impl StreamItem {
    /// Item that every target may read through the same `Arc`.
    pub fn shared<T>(item: Arc<T>) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        Self::from_arc(item, true)
    }

    /// Item that every target receives its own copy of.
    pub fn copied<T>(item: Arc<T>) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        Self::from_arc(item, false)
    }

    fn from_arc<T>(item: Arc<T>, shared: bool) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        Self {
            payload: item,
            copier: copy_payload::<T>,
            shared,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns an item backed by a fresh copy of the payload.
    ///
    /// If the copier cannot read the payload, the copy shares the original
    /// allocation and a warning is logged.
    pub fn deep_copy(&self) -> Self {
        let payload = match (self.copier)(self.payload.as_ref()) {
            Some(payload) => payload,
            None => {
                warn!(
                    event = events::STREAM_ITEM_COPY_FAILED,
                    component = COMPONENT,
                    item_type = self.type_name,
                    "payload copier rejected the payload, sharing the original"
                );
                self.payload.clone()
            }
        };
        Self {
            payload,
            copier: self.copier,
            shared: self.shared,
            type_name: self.type_name,
        }
    }

    /// Item to hand to one fan-out target.
    pub fn for_target(&self) -> Self {
        if self.shared {
            self.clone()
        } else {
            self.deep_copy()
        }
    }

    /// Whether both items read the same payload allocation.
    pub fn same_payload(&self, other: &StreamItem) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }

    /// Recovers the typed payload, returning the item unchanged on a type mismatch.
    pub fn downcast<T>(self) -> Result<Arc<T>, StreamItem>
    where
        T: Any + Send + Sync,
    {
        let Self {
            payload,
            copier,
            shared,
            type_name,
        } = self;

        payload.downcast::<T>().map_err(|payload| StreamItem {
            payload,
            copier,
            shared,
            type_name,
        })
    }
}

impl Debug for StreamItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamItem")
            .field("type_name", &self.type_name)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

/// Signal flowing from a producer to the consumers of one stream.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    Item(StreamItem),
    Completed,
    Error(String),
}

impl StreamEvent {
    /// Event to hand to one fan-out target.
    pub fn for_target(&self) -> Self {
        match self {
            StreamEvent::Item(item) => StreamEvent::Item(item.for_target()),
            StreamEvent::Completed => StreamEvent::Completed,
            StreamEvent::Error(message) => StreamEvent::Error(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{copy_payload, StreamItem};
    use std::sync::Arc;

    #[test]
    fn shared_items_fan_out_by_reference() {
        let item = StreamItem::shared(Arc::new(String::from("order-1")));

        let a = item.for_target();
        let b = item.for_target();

        assert!(a.same_payload(&b));
        assert!(a.is_shared());
    }

    #[test]
    fn copied_items_fan_out_by_value() {
        let item = StreamItem::copied(Arc::new(vec![1u8, 2, 3]));

        let a = item.for_target();
        let b = item.for_target();

        assert!(!a.same_payload(&b));
        assert!(!a.same_payload(&item));
        assert_eq!(*a.downcast::<Vec<u8>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn downcast_to_wrong_type_returns_item() {
        let item = StreamItem::shared(Arc::new(7u32));

        let item = item.downcast::<String>().unwrap_err();
        assert_eq!(item.type_name(), "u32");
        assert_eq!(*item.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn mismatched_copier_falls_back_to_the_original_payload() {
        let item = StreamItem {
            payload: Arc::new(7u32),
            copier: copy_payload::<String>,
            shared: false,
            type_name: "u32",
        };

        let copy = item.deep_copy();

        assert!(copy.same_payload(&item));
        assert_eq!(*copy.downcast::<u32>().unwrap(), 7);
    }
}
