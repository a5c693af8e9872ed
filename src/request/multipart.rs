//! `multipart/related` bodies for media uploads: a JSON metadata part followed by raw bytes.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const BOUNDARY_LEN: usize = 32;

/// Binary content sent alongside a request's JSON metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
	/// MIME type of the binary part.
	pub mime_type: String,
	/// Raw bytes.
	pub data: Vec<u8>,
}
impl Attachment {
	/// Creates an attachment of `mime_type`.
	pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
		Self { mime_type: mime_type.into(), data: data.into() }
	}
}
impl Debug for Attachment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Attachment")
			.field("mime_type", &self.mime_type)
			.field("len", &self.data.len())
			.finish()
	}
}

/// Encoded body plus the `Content-Type` header announcing its boundary.
#[derive(Debug)]
pub(crate) struct MultipartBody {
	pub(crate) content_type: String,
	pub(crate) bytes: Vec<u8>,
}

/// Encodes `metadata` and `attachment` with a fresh random boundary.
pub(crate) fn related(metadata: &Value, attachment: &Attachment) -> MultipartBody {
	let boundary = rand::rng()
		.sample_iter(Alphanumeric)
		.take(BOUNDARY_LEN)
		.map(char::from)
		.collect::<String>();

	related_with_boundary(metadata, attachment, &boundary)
}

fn related_with_boundary(metadata: &Value, attachment: &Attachment, boundary: &str) -> MultipartBody {
	let mut bytes = Vec::with_capacity(attachment.data.len() + 256);

	bytes.extend_from_slice(
		format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
			.as_bytes(),
	);
	bytes.extend_from_slice(
		format!("--{boundary}\r\nContent-Type: {}\r\n\r\n", attachment.mime_type).as_bytes(),
	);
	bytes.extend_from_slice(&attachment.data);
	bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

	MultipartBody { content_type: format!("multipart/related; boundary={boundary}"), bytes }
}
