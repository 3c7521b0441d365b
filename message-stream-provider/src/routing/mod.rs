//! Stream identity and resolution layer.
//!
//! Maps `(guid, provider, namespace)` identities to the single shared handle for
//! each logical stream. The directory is owned by the surrounding runtime and
//! injected into every provider that resolves streams through it.
//!
//! ```
//! use std::sync::Arc;
//! use message_stream_provider::{StreamDirectory, StreamHandle, StreamIdentity};
//! use uuid::Uuid;
//!
//! let directory = Arc::new(StreamDirectory::new());
//! let identity = StreamIdentity::new(Uuid::new_v4(), "sms", "orders");
//!
//! let first = directory
//!     .get_or_create(identity.clone(), || StreamHandle::<String>::new(identity.clone(), false))
//!     .unwrap();
//! let second = directory
//!     .get_or_create(identity.clone(), || StreamHandle::<String>::new(identity.clone(), false))
//!     .unwrap();
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

pub(crate) mod stream_directory;
pub(crate) mod stream_identity;
