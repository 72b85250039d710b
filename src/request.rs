//! Incoming request type.

use bytes::Bytes;

/// An incoming request with its body fully buffered.
///
/// Plain [`http::Request`]: method, URI, headers and extensions are read with
/// the usual `http` accessors. The chain never looks inside it.
pub type Request = http::Request<Bytes>;
