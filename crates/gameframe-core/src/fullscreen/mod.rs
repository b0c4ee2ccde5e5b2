#![forbid(unsafe_code)]

//! Fullscreen support: vendor API normalization and the request/change
//! lifecycle.

pub mod adapter;
pub mod lifecycle;

pub use adapter::{
    ChangeNormalizer, FullscreenAdapter, RequestFuture, VENDOR_APIS, VendorApi, probe_first,
};
pub use lifecycle::{FullscreenLifecycle, LifecyclePhase};
