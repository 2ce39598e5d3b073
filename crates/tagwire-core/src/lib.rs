//! # tagwire-core
//!
//! Recursive encoder and decoder for **tagwire**, a flat self-describing byte
//! format for trees of numbers, text and ordered mappings, running over async
//! channels that may push back on writes and trickle bytes on reads.
//!
//! Every value starts with a one-byte kind tag (`N`, `S`, `O`) followed by a
//! numeric field and, for text and mappings, a payload. Mapping keys are
//! written as full text values, so one recursive routine decodes everything.
//!
//! ## Quick start
//!
//! ```rust
//! use tagwire_core::{decode_from_slice, encode_to_vec, CodecConfig, Mapping, Value};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = CodecConfig::default();
//! let mut m = Mapping::new();
//! m.insert("a", 1.0);
//! m.insert("b", "x");
//! let value = Value::from(m);
//!
//! let bytes = encode_to_vec(&value, &config).await.unwrap();
//! assert_eq!(bytes, b"O2S1aN1S1bS1x");
//!
//! let back = decode_from_slice(&bytes, &config).await.unwrap();
//! assert_eq!(back, value);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value` tree and `Mapping`
//! - [`format`] — tags, field modes, number rendering
//! - [`flow`] — flow-controlled writer and reader
//! - [`encoder`] — `Value` → bytes
//! - [`decoder`] — bytes → `Value`
//! - [`session`] — `serialize` / `deserialize` entry points with fault racing
//! - [`config`] — per-call settings
//! - [`error`] — error taxonomy

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod flow;
pub mod format;
pub mod session;
pub mod value;

pub use config::CodecConfig;
pub use decoder::decode;
pub use encoder::encode;
pub use error::{CodecError, Result};
pub use flow::{FlowReader, FlowWriter};
pub use format::{FieldMode, Tag};
pub use session::{
    decode_from_slice, deserialize, deserialize_from, deserialize_with, encode_to_vec, serialize,
    serialize_to, serialize_with,
};
pub use value::{Kind, Mapping, Value};
