//! Runtime support for Rust clients generated by rpcgen.
//!
//! Generated code only talks to this crate through the items re-exported
//! here: the [`RpcModel`] and [`RpcEnum`] traits its types implement, the
//! [`RpcRequest`] builder its service methods dispatch through, and the
//! serialization helpers in [`utils`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rpcgen_client::{RpcClientConfig, RpcClientService};
//!
//! let config = Arc::new(RpcClientConfig::new("https://api.example.com"));
//! let client = <ShopClient as RpcClientService>::create(config.clone());
//! config.set_header("authorization", "Bearer token");
//! let user = client.users.get_user(params).await?;
//! ```

mod config;
mod error;
mod model;
mod request;
mod sse;
pub mod utils;

pub use config::{RpcClientConfig, DEFAULT_TRANSPORT};
pub use error::RpcError;
pub use model::{RpcClientService, RpcEnum, RpcModel};
pub use request::{HttpMethod, RpcRequest};
pub use sse::{SseController, SseEvent};

pub use chrono;
pub use serde_json;
