// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::error::Error;

use crpcprotos::exception::v1::ExceptionDetail;
use tonic::{
    Status,
    metadata::{Binary, KeyAndValueRef, MetadataMap, MetadataValue},
};

use crate::{ExtractError, extract::extract_exception_detail};

/// Trailing metadata key under which a failed call carries its exception detail
///
/// This is a wire contract with the servers attaching the detail.
pub const EXCEPTION_DETAIL_METADATA_KEY: &str = "__crpc_mse_300713958-bin";

/// Capability of a failed call to expose its trailing metadata.
pub trait TrailingMetadata {
    /// Returns the trailing metadata, or `None` if this value does not carry any.
    fn trailing_metadata(&self) -> Option<&MetadataMap>;

    /// Extracts the exception detail attached to the trailing metadata.
    ///
    /// See [`extract_exception_detail`].
    fn exception_detail(&self) -> Result<Option<ExceptionDetail>, ExtractError> {
        extract_exception_detail(self)
    }
}

impl TrailingMetadata for Status {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        Some(self.metadata())
    }
}

impl TrailingMetadata for MetadataMap {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        Some(self)
    }
}

impl<T: TrailingMetadata> TrailingMetadata for Option<T> {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        self.as_ref()?.trailing_metadata()
    }
}

impl<T: TrailingMetadata + ?Sized> TrailingMetadata for &T {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        (**self).trailing_metadata()
    }
}

impl<T: TrailingMetadata + ?Sized> TrailingMetadata for Box<T> {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        (**self).trailing_metadata()
    }
}

/// Looks for a [`Status`] in the source chain of the error.
impl TrailingMetadata for dyn Error + 'static {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        let mut error: Option<&(dyn Error + 'static)> = Some(self);
        while let Some(current) = error {
            if let Some(status) = current.downcast_ref::<Status>() {
                return Some(status.metadata());
            }
            error = current.source();
        }
        None
    }
}

impl TrailingMetadata for dyn Error + Send + Sync + 'static {
    fn trailing_metadata(&self) -> Option<&MetadataMap> {
        let error: &(dyn Error + 'static) = self;
        error.trailing_metadata()
    }
}

/// Returns the value of the last binary entry with the given key.
pub(crate) fn last_binary_value<'a>(
    metadata: &'a MetadataMap,
    key: &str,
) -> Option<&'a MetadataValue<Binary>> {
    metadata
        .iter()
        .filter_map(|entry| match entry {
            KeyAndValueRef::Binary(entry_key, value) if entry_key.as_str() == key => Some(value),
            _ => None,
        })
        .last()
}

#[cfg(test)]
mod tests {
    use std::io;

    use tonic::Code;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct RequestError(#[source] Status);

    #[derive(Debug, thiserror::Error)]
    #[error("operation failed")]
    struct OperationError(#[source] RequestError);

    fn status_with_entry(value: &[u8]) -> Status {
        let mut metadata = MetadataMap::new();
        metadata.append_bin(EXCEPTION_DETAIL_METADATA_KEY, MetadataValue::from_bytes(value));
        Status::with_metadata(Code::Internal, "failed", metadata)
    }

    #[test]
    fn last_binary_value_wins() {
        let mut metadata = MetadataMap::new();
        metadata.append_bin(EXCEPTION_DETAIL_METADATA_KEY, MetadataValue::from_bytes(b"first"));
        metadata.append_bin("other-bin", MetadataValue::from_bytes(b"other"));
        metadata.append_bin(EXCEPTION_DETAIL_METADATA_KEY, MetadataValue::from_bytes(b"last"));

        let value = last_binary_value(&metadata, EXCEPTION_DETAIL_METADATA_KEY).unwrap();
        assert_eq!(value.to_bytes().unwrap().as_ref(), b"last");
    }

    #[test]
    fn last_binary_value_ignores_ascii_and_other_keys() {
        let mut metadata = MetadataMap::new();
        metadata.insert("x-request-id", "abc".parse().unwrap());
        metadata.append_bin("__crpc_mse_300713959-bin", MetadataValue::from_bytes(b"x"));

        assert!(last_binary_value(&metadata, EXCEPTION_DETAIL_METADATA_KEY).is_none());
    }

    #[test]
    fn status_exposes_metadata() {
        let status = status_with_entry(b"payload");
        let metadata = status.trailing_metadata().unwrap();
        assert!(last_binary_value(metadata, EXCEPTION_DETAIL_METADATA_KEY).is_some());
    }

    #[test]
    fn status_in_error_chain() {
        let error = OperationError(RequestError(status_with_entry(b"payload")));
        let error: &(dyn Error + 'static) = &error;
        assert!(error.trailing_metadata().is_some());

        let boxed: Box<dyn Error + Send + Sync> = Box::new(error_without_status());
        assert!(boxed.trailing_metadata().is_none());
    }

    #[test]
    fn no_metadata_capability() {
        let error = error_without_status();
        let error: &(dyn Error + 'static) = &error;
        assert!(error.trailing_metadata().is_none());

        let missing: Option<Status> = None;
        assert!(missing.trailing_metadata().is_none());
    }

    fn error_without_status() -> io::Error {
        io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")
    }
}
