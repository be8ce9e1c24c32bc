//! Image acquisition for the VisionGate gateway.
//!
//! The OCR core only ever sees validated bytes; everything about where an
//! image came from (multipart upload, remote URL, inline base64) is
//! resolved here.

pub mod decode;
pub mod fetch;
pub mod mime_detect;
pub mod source;

pub use decode::{decode_base64_image, DecodedImage};
pub use fetch::{parse_image_url, ImageFetcher};
pub use mime_detect::{detect_image_mime, detect_mime_type, is_image};
pub use source::{acquire_image, validate_image, AcquiredImage, ImageSource};
