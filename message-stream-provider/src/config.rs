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

//! Provider configuration keys, property sources, and the committed configuration.

use crate::delivery_mode::DeliveryMode;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DELIVERY_MODE: &str = "DeliveryMode";
/// Older name of [`DELIVERY_MODE`], read only when the new key is absent.
pub const LEGACY_PUB_SUB_TYPE: &str = "PubSubType";
pub const FIRE_AND_FORGET_DELIVERY: &str = "FireAndForgetDelivery";
pub const OPTIMIZE_FOR_IMMUTABLE_DATA: &str = "OptimizeForImmutableData";

pub const DEFAULT_DELIVERY_MODE: DeliveryMode = DeliveryMode::ExplicitAndImplicit;
pub const DEFAULT_FIRE_AND_FORGET_DELIVERY: bool = false;
pub const DEFAULT_OPTIMIZE_FOR_IMMUTABLE_DATA: bool = true;

/// Named, string-keyed property lookup.
pub trait ConfigSource: Send + Sync {
    fn property(&self, key: &str) -> Option<String>;

    fn bool_property(&self, key: &str, default: bool) -> Result<bool, ConfigurationError> {
        match self.property(key) {
            None => Ok(default),
            Some(value) => parse_bool(key, &value),
        }
    }

    fn string_property(&self, key: &str, default: &str) -> String {
        self.property(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigurationError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigurationError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(value) => write!(f, "{value}"),
            PropertyValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// In-memory property bag, loadable from json5.
///
/// ```
/// use message_stream_provider::{ConfigSource, ProviderConfiguration};
///
/// let config = ProviderConfiguration::from_json5_str(
///     r#"{ properties: { DeliveryMode: "ImplicitOnly", FireAndForgetDelivery: true } }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.property("DeliveryMode").as_deref(), Some("ImplicitOnly"));
/// assert!(config.bool_property("FireAndForgetDelivery", false).unwrap());
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfiguration {
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

impl ProviderConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigurationError> {
        json5::from_str(contents).map_err(ConfigurationError::Parse)
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigurationError::Io)?;
        Self::from_json5_str(&contents)
    }
}

impl ConfigSource for ProviderConfiguration {
    fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(PropertyValue::to_string)
    }
}

/// Provider settings fixed by a committed init.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderConfig {
    name: String,
    fire_and_forget_delivery: bool,
    optimize_for_immutable_data: bool,
    delivery_mode: DeliveryMode,
}

impl ProviderConfig {
    /// Reads every provider key from `source`, applying defaults for absent keys.
    pub fn from_source(name: &str, source: &dyn ConfigSource) -> Result<Self, ConfigurationError> {
        let fire_and_forget_delivery =
            source.bool_property(FIRE_AND_FORGET_DELIVERY, DEFAULT_FIRE_AND_FORGET_DELIVERY)?;
        let optimize_for_immutable_data = source.bool_property(
            OPTIMIZE_FOR_IMMUTABLE_DATA,
            DEFAULT_OPTIMIZE_FOR_IMMUTABLE_DATA,
        )?;
        let delivery_mode = match source
            .property(DELIVERY_MODE)
            .or_else(|| source.property(LEGACY_PUB_SUB_TYPE))
        {
            Some(value) => DeliveryMode::parse(&value)?,
            None => DEFAULT_DELIVERY_MODE,
        };

        Ok(Self {
            name: name.to_string(),
            fire_and_forget_delivery,
            optimize_for_immutable_data,
            delivery_mode,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fire_and_forget_delivery(&self) -> bool {
        self.fire_and_forget_delivery
    }

    pub fn optimize_for_immutable_data(&self) -> bool {
        self.optimize_for_immutable_data
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }
}
