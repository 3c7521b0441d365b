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

//! Failures surfaced by the provider and its collaborators.

use crate::delivery_mode::DeliveryModeParseError;
use crate::routing::stream_directory::StreamTypeMismatch;
use crate::routing::stream_identity::StreamIdentity;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invalid or unreadable provider configuration.
#[derive(Debug)]
pub enum ConfigurationError {
    InvalidDeliveryMode(DeliveryModeParseError),
    InvalidBool { key: String, value: String },
    Io(std::io::Error),
    Parse(json5::Error),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidDeliveryMode(err) => write!(f, "{err}"),
            ConfigurationError::InvalidBool { key, value } => {
                write!(f, "property {key} expects a boolean, got '{value}'")
            }
            ConfigurationError::Io(err) => write!(f, "unable to read configuration: {err}"),
            ConfigurationError::Parse(err) => write!(f, "unable to parse configuration: {err}"),
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigurationError::InvalidDeliveryMode(err) => Some(err),
            ConfigurationError::InvalidBool { .. } => None,
            ConfigurationError::Io(err) => Some(err),
            ConfigurationError::Parse(err) => Some(err),
        }
    }
}

impl From<DeliveryModeParseError> for ConfigurationError {
    fn from(err: DeliveryModeParseError) -> Self {
        ConfigurationError::InvalidDeliveryMode(err)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeliveryErrorKind {
    NotFound,
    AlreadyExists,
    Unavailable,
    Rejected,
}

/// Failure reported by a pub-sub backend or subscription manager.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveryError {
    kind: DeliveryErrorKind,
    message: String,
}

impl DeliveryError {
    pub fn new(kind: DeliveryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DeliveryErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for DeliveryError {}

/// Provider-level failures.
#[derive(Debug)]
pub enum ProviderError {
    Configuration(ConfigurationError),
    MissingDependency { service: &'static str },
    NotInitialized,
    StreamTypeMismatch(StreamTypeMismatch),
    NoDeliveryBackend { stream: StreamIdentity },
    Delivery(DeliveryError),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Configuration(err) => write!(f, "configuration error: {err}"),
            ProviderError::MissingDependency { service } => {
                write!(f, "required service is not registered: {service}")
            }
            ProviderError::NotInitialized => write!(f, "provider has not been initialized"),
            ProviderError::StreamTypeMismatch(err) => write!(f, "{err}"),
            ProviderError::NoDeliveryBackend { stream } => {
                write!(f, "no pub-sub backend is configured for stream {stream}")
            }
            ProviderError::Delivery(err) => write!(f, "delivery failed: {err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProviderError::Configuration(err) => Some(err),
            ProviderError::StreamTypeMismatch(err) => Some(err),
            ProviderError::Delivery(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for ProviderError {
    fn from(err: ConfigurationError) -> Self {
        ProviderError::Configuration(err)
    }
}

impl From<StreamTypeMismatch> for ProviderError {
    fn from(err: StreamTypeMismatch) -> Self {
        ProviderError::StreamTypeMismatch(err)
    }
}

impl From<DeliveryError> for ProviderError {
    fn from(err: DeliveryError) -> Self {
        ProviderError::Delivery(err)
    }
}
