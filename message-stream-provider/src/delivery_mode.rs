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

//! Subscription strategy selected once per provider from configuration.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed set of publish-subscribe delivery strategies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeliveryMode {
    /// Explicit subscriptions backed by a subscription manager, plus implicit ones.
    #[default]
    ExplicitAndImplicit,
    ExplicitOnly,
    ImplicitOnly,
    /// No pub-sub backend; producers drop items and consumers cannot subscribe.
    None,
}

const EXPLICIT_AND_IMPLICIT: &str = "ExplicitAndImplicit";
const EXPLICIT_ONLY: &str = "ExplicitOnly";
const IMPLICIT_ONLY: &str = "ImplicitOnly";
const NONE: &str = "None";

impl DeliveryMode {
    pub const ALL: [DeliveryMode; 4] = [
        DeliveryMode::ExplicitAndImplicit,
        DeliveryMode::ExplicitOnly,
        DeliveryMode::ImplicitOnly,
        DeliveryMode::None,
    ];

    /// Parses a configuration value. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Result<Self, DeliveryModeParseError> {
        match value.trim() {
            EXPLICIT_AND_IMPLICIT => Ok(DeliveryMode::ExplicitAndImplicit),
            EXPLICIT_ONLY => Ok(DeliveryMode::ExplicitOnly),
            IMPLICIT_ONLY => Ok(DeliveryMode::ImplicitOnly),
            NONE => Ok(DeliveryMode::None),
            _ => Err(DeliveryModeParseError {
                value: value.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::ExplicitAndImplicit => EXPLICIT_AND_IMPLICIT,
            DeliveryMode::ExplicitOnly => EXPLICIT_ONLY,
            DeliveryMode::ImplicitOnly => IMPLICIT_ONLY,
            DeliveryMode::None => NONE,
        }
    }

    /// Whether this mode needs the explicit-subscribe-only subscription manager.
    pub fn requires_explicit_subscriptions(&self) -> bool {
        matches!(
            self,
            DeliveryMode::ExplicitAndImplicit | DeliveryMode::ExplicitOnly
        )
    }

    /// Whether this mode routes items through a pub-sub backend at all.
    pub fn has_pub_sub(&self) -> bool {
        !matches!(self, DeliveryMode::None)
    }
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = DeliveryModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliveryMode::parse(s)
    }
}

/// A configuration value that names no known delivery mode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveryModeParseError {
    value: String,
}

impl DeliveryModeParseError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for DeliveryModeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized delivery mode '{}', expected one of: {EXPLICIT_AND_IMPLICIT}, {EXPLICIT_ONLY}, {IMPLICIT_ONLY}, {NONE}",
            self.value
        )
    }
}

impl Error for DeliveryModeParseError {}
