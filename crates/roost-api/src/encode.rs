//! Inline `data:` URI encoding for image payloads.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use roost_core::image::ImageData;

/// Render `data` as `data:<media type>;base64,<payload>`.
pub fn data_uri(data: &ImageData) -> String {
  format!("data:{};base64,{}", data.media_type, B64.encode(&data.bytes))
}
