//! Request extractors.

mod upload_file;

pub use upload_file::{FILE_FIELD, MULTIPART_OVERHEAD, receive_file};
