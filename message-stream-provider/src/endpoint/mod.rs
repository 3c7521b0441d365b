//! Typed producer and consumer endpoints.
//!
//! Endpoints wrap the shared [`StreamHandle`](crate::StreamHandle) of one stream and
//! bind the policy committed by the provider's init: the delivery-mode pub-sub
//! backend, the serializer, and the explicit subscription manager when the delivery
//! mode needs one. Building an endpoint never touches the stream directory.

pub(crate) mod consumer;
pub(crate) mod producer;

#[cfg(test)]
mod tests {
    use super::consumer::{ConsumerEndpoint, StreamObserver};
    use super::producer::ProducerEndpoint;
    use crate::error::{DeliveryError, DeliveryErrorKind, ProviderError};
    use crate::routing::stream_identity::StreamIdentity;
    use crate::runtime::pub_sub::{StreamPubSub, StreamSink, SubscriptionId};
    use crate::runtime::services::CloneSerializer;
    use crate::runtime::stream_item::StreamEvent;
    use crate::stream_handle::StreamHandle;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingPubSub {
        published: Mutex<Vec<StreamEvent>>,
        sinks: Mutex<HashMap<SubscriptionId, Arc<dyn StreamSink>>>,
        reject_publish: bool,
    }

    #[async_trait]
    impl StreamPubSub for RecordingPubSub {
        async fn register_consumer(
            &self,
            _stream: &StreamIdentity,
            subscription_id: SubscriptionId,
            sink: Arc<dyn StreamSink>,
        ) -> Result<(), DeliveryError> {
            self.sinks.lock().unwrap().insert(subscription_id, sink);
            Ok(())
        }

        async fn unregister_consumer(
            &self,
            _stream: &StreamIdentity,
            subscription_id: SubscriptionId,
        ) -> Result<(), DeliveryError> {
            match self.sinks.lock().unwrap().remove(&subscription_id) {
                Some(_) => Ok(()),
                None => Err(DeliveryError::new(
                    DeliveryErrorKind::NotFound,
                    "unknown subscription",
                )),
            }
        }

        async fn consumer_subscriptions(
            &self,
            _stream: &StreamIdentity,
        ) -> Result<Vec<SubscriptionId>, DeliveryError> {
            Ok(self.sinks.lock().unwrap().keys().copied().collect())
        }

        async fn publish(
            &self,
            _stream: &StreamIdentity,
            event: StreamEvent,
        ) -> Result<(), DeliveryError> {
            if self.reject_publish {
                return Err(DeliveryError::new(DeliveryErrorKind::Rejected, "closed"));
            }
            let sinks: Vec<_> = self.sinks.lock().unwrap().values().cloned().collect();
            for sink in sinks {
                sink.deliver(event.for_target()).await;
            }
            self.published.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingObserver {
        items: Mutex<Vec<Arc<String>>>,
        completed: Mutex<bool>,
    }

    #[async_trait]
    impl StreamObserver<String> for CollectingObserver {
        async fn on_next(&self, item: Arc<String>) {
            self.items.lock().unwrap().push(item);
        }

        async fn on_completed(&self) {
            *self.completed.lock().unwrap() = true;
        }
    }

    fn handle() -> Arc<StreamHandle<String>> {
        Arc::new(StreamHandle::new(
            StreamIdentity::new(Uuid::new_v4(), "sms", "orders"),
            false,
        ))
    }

    fn producer(
        handle: &Arc<StreamHandle<String>>,
        optimize_for_immutable_data: bool,
        pub_sub: Option<Arc<RecordingPubSub>>,
    ) -> ProducerEndpoint<String> {
        ProducerEndpoint::new(
            handle.clone(),
            false,
            optimize_for_immutable_data,
            pub_sub.map(|pub_sub| pub_sub as Arc<dyn StreamPubSub>),
            Arc::new(CloneSerializer),
        )
    }

    #[tokio::test]
    async fn shared_items_reach_observers_by_reference() {
        let pub_sub = Arc::new(RecordingPubSub::default());
        let handle = handle();
        let consumer = ConsumerEndpoint::new(handle.clone(), Some(pub_sub.clone()), None);
        let observer = Arc::new(CollectingObserver::default());
        consumer.subscribe(observer.clone()).await.unwrap();

        let item = Arc::new(String::from("order-1"));
        producer(&handle, true, Some(pub_sub.clone()))
            .on_next(item.clone())
            .await
            .unwrap();

        let items = observer.items.lock().unwrap();
        assert_eq!(items.len(), 1);
        assert!(Arc::ptr_eq(&items[0], &item));
    }

    #[tokio::test]
    async fn copied_items_never_alias_the_producer_value() {
        let pub_sub = Arc::new(RecordingPubSub::default());
        let handle = handle();
        let consumer = ConsumerEndpoint::new(handle.clone(), Some(pub_sub.clone()), None);
        let observer = Arc::new(CollectingObserver::default());
        consumer.subscribe(observer.clone()).await.unwrap();

        let item = Arc::new(String::from("order-1"));
        producer(&handle, false, Some(pub_sub.clone()))
            .on_next(item.clone())
            .await
            .unwrap();

        let items = observer.items.lock().unwrap();
        assert_eq!(*items[0], "order-1");
        assert!(!Arc::ptr_eq(&items[0], &item));
    }

    #[tokio::test]
    async fn completion_is_forwarded_to_observers() {
        let pub_sub = Arc::new(RecordingPubSub::default());
        let handle = handle();
        let consumer = ConsumerEndpoint::new(handle.clone(), Some(pub_sub.clone()), None);
        let observer = Arc::new(CollectingObserver::default());
        consumer.subscribe(observer.clone()).await.unwrap();

        let producer = producer(&handle, true, Some(pub_sub));
        producer
            .on_next_batch(vec![String::from("a"), String::from("b")])
            .await
            .unwrap();
        producer.on_completed().await.unwrap();

        assert_eq!(observer.items.lock().unwrap().len(), 2);
        assert!(*observer.completed.lock().unwrap());
    }

    #[tokio::test]
    async fn rejected_publish_surfaces_delivery_error() {
        let pub_sub = Arc::new(RecordingPubSub {
            reject_publish: true,
            ..RecordingPubSub::default()
        });
        let handle = handle();

        let result = producer(&handle, true, Some(pub_sub))
            .on_next(String::from("order-1"))
            .await;

        match result {
            Err(ProviderError::Delivery(err)) => {
                assert_eq!(err.kind(), DeliveryErrorKind::Rejected)
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn producer_without_backend_drops_silently() {
        let handle = handle();

        let producer = producer(&handle, true, None);

        assert!(producer.pub_sub().is_none());
        producer.on_next(String::from("order-1")).await.unwrap();
    }

    #[tokio::test]
    async fn unsubscribe_rejects_handle_of_another_stream() {
        let pub_sub = Arc::new(RecordingPubSub::default());
        let first = ConsumerEndpoint::new(handle(), Some(pub_sub.clone()), None);
        let second = ConsumerEndpoint::new(handle(), Some(pub_sub.clone()), None);
        let observer = Arc::new(CollectingObserver::default());

        let subscription = first.subscribe(observer).await.unwrap();

        match second.unsubscribe(&subscription).await {
            Err(ProviderError::Delivery(err)) => {
                assert_eq!(err.kind(), DeliveryErrorKind::NotFound)
            }
            other => panic!("expected not-found, got {other:?}"),
        }
        first.unsubscribe(&subscription).await.unwrap();
        assert!(first.all_subscriptions().await.unwrap().is_empty());
    }
}
