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

use async_trait::async_trait;
use message_stream_provider::StreamObserver;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Observer storing every event it receives.
pub struct RecordingObserver<T> {
    items: Mutex<Vec<Arc<T>>>,
    errors: Mutex<Vec<String>>,
    completed: Mutex<bool>,
}

impl<T> RecordingObserver<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            completed: Mutex::new(false),
        }
    }

    pub async fn items(&self) -> Vec<Arc<T>> {
        self.items.lock().await.clone()
    }

    pub async fn errors(&self) -> Vec<String> {
        self.errors.lock().await.clone()
    }

    pub async fn is_completed(&self) -> bool {
        *self.completed.lock().await
    }

    /// Polls until at least `count` items arrived or `timeout` elapsed.
    pub async fn wait_for_items(&self, count: usize, timeout: Duration) -> Vec<Arc<T>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let items = self.items().await;
            if items.len() >= count || tokio::time::Instant::now() >= deadline {
                return items;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Polls until completion was signalled or `timeout` elapsed.
    pub async fn wait_for_completion(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let completed = self.is_completed().await;
            if completed || tokio::time::Instant::now() >= deadline {
                return completed;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl<T> Default for RecordingObserver<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> StreamObserver<T> for RecordingObserver<T>
where
    T: Send + Sync + 'static,
{
    async fn on_next(&self, item: Arc<T>) {
        self.items.lock().await.push(item);
    }

    async fn on_completed(&self) {
        debug!("recording observer completed");
        *self.completed.lock().await = true;
    }

    async fn on_error(&self, message: String) {
        debug!(%message, "recording observer received error");
        self.errors.lock().await.push(message);
    }
}
