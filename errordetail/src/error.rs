// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use tonic::metadata::errors::InvalidMetadataValueBytes;

/// Errors that can occur when decoding an exception detail which is present in the trailing
/// metadata.
///
/// A missing exception detail is not an error.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Exception detail metadata value is not valid base64")]
    InvalidMetadataValue(#[from] InvalidMetadataValueBytes),
    #[error("Malformed rpc error payload")]
    MalformedPayload(#[source] prost::DecodeError),
    #[error("Corrupt compressed exception detail")]
    Decompression(#[from] flate2::DecompressError),
    #[error("Compressed exception detail is truncated")]
    Truncated,
    #[error("Decompressed exception detail exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("Malformed exception detail")]
    MalformedExceptionDetail(#[source] prost::DecodeError),
}

/// Coarse classification of [`ExtractError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// The metadata value is not a valid rpc error payload.
    MalformedPayload,
    /// The compressed exception detail could not be inflated.
    DecompressionFailure,
    /// The inflated bytes are not a valid exception detail.
    MalformedExceptionDetail,
}

impl ExtractError {
    pub fn kind(&self) -> ExtractErrorKind {
        match self {
            Self::InvalidMetadataValue(_) | Self::MalformedPayload(_) => {
                ExtractErrorKind::MalformedPayload
            }
            Self::Decompression(_) | Self::Truncated | Self::TooLarge { .. } => {
                ExtractErrorKind::DecompressionFailure
            }
            Self::MalformedExceptionDetail(_) => ExtractErrorKind::MalformedExceptionDetail,
        }
    }
}
