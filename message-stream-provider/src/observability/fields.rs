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

//! Canonical structured field values and value-format helpers.

pub const NONE: &str = "none";

/// Category requested from the logger factory for provider spans.
pub const PROVIDER_LOGGER_CATEGORY: &str = "message_stream_provider::provider";

/// Formats a provider name that is only known after a committed init.
pub fn format_provider_name(name: Option<&str>) -> String {
    name.unwrap_or(NONE).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_provider_name, NONE};

    #[test]
    fn format_provider_name_falls_back_to_none() {
        assert_eq!(format_provider_name(None), NONE);
        assert_eq!(format_provider_name(Some("sms")), "sms");
    }
}
