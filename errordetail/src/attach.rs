// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Server side of the exception detail metadata

use std::io::{self, Write};

use crpcprotos::{crpc::v1::RpcErrorPayload, exception::v1::ExceptionDetail};
use flate2::{Compression, write::ZlibEncoder};
use prost::Message;
use tonic::{
    Code, Status,
    metadata::{MetadataMap, MetadataValue},
};

use crate::{EXCEPTION_DETAIL_METADATA_KEY, Settings};

/// Encodes the exception detail and compresses it as a zlib stream.
pub fn compress_exception_detail(
    detail: &ExceptionDetail,
    compression: Compression,
) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), compression);
    encoder.write_all(&detail.encode_to_vec())?;
    encoder.finish()
}

/// Encodes the exception detail as the value of the trailing metadata entry.
pub fn encode_rpc_error_payload(
    detail: &ExceptionDetail,
    compression: Compression,
) -> io::Result<Vec<u8>> {
    let compressed = compress_exception_detail(detail, compression)?;
    Ok(RpcErrorPayload::with_compressed_exception_detail(compressed).encode_to_vec())
}

/// Appends the exception detail to the metadata.
///
/// Use [`Settings::compression`] to apply the configured compression level.
///
/// Entries already present under the same key are kept, but they are shadowed by the new one.
pub fn attach_exception_detail(
    metadata: &mut MetadataMap,
    detail: &ExceptionDetail,
    compression: Compression,
) -> io::Result<()> {
    let payload = encode_rpc_error_payload(detail, compression)?;
    metadata.append_bin(
        EXCEPTION_DETAIL_METADATA_KEY,
        MetadataValue::from_bytes(&payload),
    );
    Ok(())
}

/// Creates a failed status carrying the exception detail in its metadata.
///
/// Compresses with the level of the default [`Settings`].
pub fn status_with_exception_detail(
    code: Code,
    message: impl Into<String>,
    detail: &ExceptionDetail,
) -> io::Result<Status> {
    exception_status(code, message, detail, &Settings::default())
}

/// Creates a failed status carrying the exception detail, compressed with the configured level.
pub fn exception_status(
    code: Code,
    message: impl Into<String>,
    detail: &ExceptionDetail,
    settings: &Settings,
) -> io::Result<Status> {
    let mut metadata = MetadataMap::new();
    attach_exception_detail(&mut metadata, detail, settings.compression())?;
    Ok(Status::with_metadata(code, message, metadata))
}
