// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structured exception details of failed gRPC calls
//!
//! A server may attach an [`ExceptionDetail`] to a failed call. It is encoded, zlib compressed,
//! wrapped into an [`RpcErrorPayload`] and put into the trailing metadata under
//! [`EXCEPTION_DETAIL_METADATA_KEY`].
//!
//! On the client side, [`extract_exception_detail`] (or [`TrailingMetadata::exception_detail`])
//! recovers the detail. Most failed calls do not carry one, in which case the result is
//! `Ok(None)`. A payload which is present but cannot be decoded is an error, because it means
//! that client and server disagree about the format.
//!
//! ```ignore
//! match client.run(request).await {
//!     Ok(response) => ...,
//!     Err(status) => {
//!         if let Some(detail) = status.exception_detail()? {
//!             error!(%detail, "remote exception");
//!         }
//!     }
//! }
//! ```

mod attach;
mod error;
mod extract;
mod metadata;
pub mod settings;

pub use attach::{
    attach_exception_detail, compress_exception_detail, encode_rpc_error_payload,
    exception_status, status_with_exception_detail,
};
pub use crpcprotos::{crpc::v1::RpcErrorPayload, exception::v1::ExceptionDetail};
pub use error::{ExtractError, ExtractErrorKind};
pub use extract::{Extractor, extract_exception_detail};
pub use metadata::{EXCEPTION_DETAIL_METADATA_KEY, TrailingMetadata};
pub use settings::Settings;
