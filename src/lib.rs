//! Discovery-driven Google API calls: name a method, pass flat arguments, and let the broker
//! resolve the endpoint shape from discovery documents while credentials refresh underneath.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod credential;
pub mod discovery;
pub mod error;
pub mod http;
pub mod json_path;
pub mod oauth;
pub mod obs;
pub mod request;
pub mod resolve;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")]
pub use client::ReqwestApiClient;
pub use client::ApiClient;
pub use credential::Credential;
pub use request::{Attachment, BuiltRequest, CallArgs};
pub use resolve::{BulkLookup, ChannelResolver};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
