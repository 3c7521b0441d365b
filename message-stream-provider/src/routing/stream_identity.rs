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

//! Value key identifying one logical stream.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// `(guid, provider name, namespace)` triple used as the stream directory key.
///
/// Equality and hashing cover all three fields and nothing else.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StreamIdentity {
    guid: Uuid,
    provider_name: Arc<str>,
    namespace: Arc<str>,
}

impl StreamIdentity {
    pub fn new(guid: Uuid, provider_name: &str, namespace: &str) -> Self {
        Self {
            guid,
            provider_name: Arc::from(provider_name),
            namespace: Arc::from(namespace),
        }
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Display for StreamIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.provider_name,
            self.namespace,
            self.guid.hyphenated()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::StreamIdentity;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn identities_with_equal_fields_dedupe() {
        let guid = Uuid::new_v4();

        let mut seen = HashSet::new();
        seen.insert(StreamIdentity::new(guid, "sms", "orders"));
        seen.insert(StreamIdentity::new(guid, "sms", "orders"));

        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn every_field_participates_in_equality() {
        let guid = Uuid::new_v4();
        let base = StreamIdentity::new(guid, "sms", "orders");

        assert_ne!(base, StreamIdentity::new(Uuid::new_v4(), "sms", "orders"));
        assert_ne!(base, StreamIdentity::new(guid, "other", "orders"));
        assert_ne!(base, StreamIdentity::new(guid, "sms", "invoices"));
    }

    #[test]
    fn display_is_provider_namespace_guid() {
        let guid = Uuid::nil();
        let identity = StreamIdentity::new(guid, "sms", "orders");

        assert_eq!(
            identity.to_string(),
            "sms/orders/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(identity.guid(), guid);
        assert_eq!(identity.provider_name(), "sms");
        assert_eq!(identity.namespace(), "orders");
    }
}
