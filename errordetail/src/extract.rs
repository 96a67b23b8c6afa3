// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crpcprotos::{crpc::v1::RpcErrorPayload, exception::v1::ExceptionDetail};
use flate2::{Decompress, FlushDecompress, Status as InflateStatus};
use prost::Message;
use tonic::metadata::{Binary, MetadataValue};
use tracing::{debug, warn};

use crate::{
    EXCEPTION_DETAIL_METADATA_KEY, ExtractError, Settings, TrailingMetadata,
    metadata::last_binary_value,
};

const INFLATE_CHUNK_SIZE: usize = 4 * 1024;

/// Extracts exception details from failed calls.
#[derive(Debug, Clone)]
pub struct Extractor {
    max_decompressed_size: Option<usize>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Extractor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            max_decompressed_size: settings.max_decompressed_size,
        }
    }

    /// Extracts the exception detail attached to the trailing metadata of a failed call.
    ///
    /// Returns `Ok(None)` if the call does not expose trailing metadata, or if there is no entry
    /// with the key [`EXCEPTION_DETAIL_METADATA_KEY`]. If there are several entries, the last one
    /// is decoded.
    ///
    /// An entry which is present but can't be decoded results in an error.
    pub fn extract<C: TrailingMetadata + ?Sized>(
        &self,
        call: &C,
    ) -> Result<Option<ExceptionDetail>, ExtractError> {
        let Some(metadata) = call.trailing_metadata() else {
            return Ok(None);
        };
        let Some(value) = last_binary_value(metadata, EXCEPTION_DETAIL_METADATA_KEY) else {
            return Ok(None);
        };
        self.decode(value).map(Some).inspect_err(|error| {
            warn!(%error, kind = ?error.kind(), "failed to decode exception detail");
        })
    }

    fn decode(&self, value: &MetadataValue<Binary>) -> Result<ExceptionDetail, ExtractError> {
        let payload =
            RpcErrorPayload::decode(value.to_bytes()?).map_err(ExtractError::MalformedPayload)?;
        let compressed = payload.into_compressed_exception_detail();
        let decompressed = inflate(&compressed, self.max_decompressed_size)?;
        let detail = ExceptionDetail::decode(decompressed.as_slice())
            .map_err(ExtractError::MalformedExceptionDetail)?;
        debug!(
            compressed_len = compressed.len(),
            decompressed_len = decompressed.len(),
            "decoded exception detail"
        );
        Ok(detail)
    }
}

/// Extracts the exception detail of a failed call with default [`Settings`].
///
/// See [`Extractor::extract`].
pub fn extract_exception_detail<C: TrailingMetadata + ?Sized>(
    call: &C,
) -> Result<Option<ExceptionDetail>, ExtractError> {
    Extractor::default().extract(call)
}

/// Inflates a complete zlib stream.
///
/// Unlike the `Read` based decoders, a stream which ends before its trailer is an error.
fn inflate(compressed: &[u8], limit: Option<usize>) -> Result<Vec<u8>, ExtractError> {
    let mut decompress = Decompress::new(true);
    let mut decompressed = Vec::with_capacity(INFLATE_CHUNK_SIZE);
    loop {
        if decompressed.len() == decompressed.capacity() {
            decompressed.reserve(decompressed.len().max(INFLATE_CHUNK_SIZE));
        }

        let total_in = decompress.total_in();
        let total_out = decompress.total_out();
        // total_in never exceeds the input length
        let input = &compressed[total_in as usize..];
        let status =
            decompress.decompress_vec(input, &mut decompressed, FlushDecompress::None)?;

        if let Some(limit) = limit.filter(|&limit| decompressed.len() > limit) {
            return Err(ExtractError::TooLarge { limit });
        }

        match status {
            InflateStatus::StreamEnd => return Ok(decompressed),
            InflateStatus::Ok | InflateStatus::BufError => {
                let progressed =
                    decompress.total_in() > total_in || decompress.total_out() > total_out;
                if !progressed && decompressed.len() < decompressed.capacity() {
                    return Err(ExtractError::Truncated);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{Compression, write::ZlibEncoder};

    use super::*;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflate_roundtrip_larger_than_chunk() {
        let data: Vec<u8> = (0..10 * INFLATE_CHUNK_SIZE).map(|i| (i % 251) as u8).collect();
        let inflated = inflate(&deflate(&data), None).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn inflate_empty_stream() {
        let inflated = inflate(&deflate(b""), None).unwrap();
        assert!(inflated.is_empty());
    }

    #[test]
    fn inflate_empty_input_is_truncated() {
        let error = inflate(b"", None).unwrap_err();
        assert!(matches!(error, ExtractError::Truncated), "{error:?}");
    }

    #[test]
    fn inflate_truncated_input() {
        let data: Vec<u8> = (0..1024u32).flat_map(|i| i.to_le_bytes()).collect();
        let compressed = deflate(&data);
        for len in [1, 2, compressed.len() / 2, compressed.len() - 1] {
            let error = inflate(&compressed[..len], None).unwrap_err();
            assert!(
                matches!(
                    error,
                    ExtractError::Truncated | ExtractError::Decompression(_)
                ),
                "len = {len}: {error:?}"
            );
        }
    }

    #[test]
    fn inflate_corrupt_header() {
        let error = inflate(b"not a zlib stream", None).unwrap_err();
        assert!(matches!(error, ExtractError::Decompression(_)), "{error:?}");
    }

    #[test]
    fn inflate_limit() {
        let data = vec![0u8; 64 * 1024];
        let compressed = deflate(&data);

        assert_eq!(inflate(&compressed, Some(data.len())).unwrap(), data);

        let error = inflate(&compressed, Some(1000)).unwrap_err();
        assert!(
            matches!(error, ExtractError::TooLarge { limit: 1000 }),
            "{error:?}"
        );
    }
}
