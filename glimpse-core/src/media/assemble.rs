//! Chunk assembly
//!
//! Pure merge of recorded chunks into one artifact.

use bytes::BytesMut;

use super::constraints::BlobOptions;
use crate::error::{CaptureError, Result};
use crate::types::{MediaArtifact, MediaChunk};

/// Concatenate `chunks` in arrival order into one artifact
///
/// The content type comes from the first chunk unless `options` overrides
/// it. An empty chunk list is rejected rather than producing a zero-byte
/// artifact.
pub fn assemble(chunks: &[MediaChunk], options: &BlobOptions) -> Result<MediaArtifact> {
    let Some(first) = chunks.first() else {
        return Err(CaptureError::EmptyArtifact);
    };

    let content_type = options
        .content_type
        .clone()
        .unwrap_or_else(|| first.content_type.clone());

    let total: usize = chunks.iter().map(MediaChunk::len).sum();
    let mut data = BytesMut::with_capacity(total);
    for chunk in chunks {
        data.extend_from_slice(&chunk.data);
    }

    Ok(MediaArtifact::new(data.freeze(), content_type, chunks.len()))
}
