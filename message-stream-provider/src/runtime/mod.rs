//! Runtime integration layer.
//!
//! Declares the collaborator seams the provider reaches through: the service
//! locator bundle resolved during init, the delivery-mode pub-sub backend, and
//! the explicit subscription manager registry. Concrete backends live outside
//! this crate.

pub(crate) mod pub_sub;
pub(crate) mod services;
pub(crate) mod stream_item;
pub(crate) mod subscription_manager;
