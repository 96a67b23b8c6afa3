// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

tonic::include_proto!("crpc.v1");

impl RpcErrorPayload {
    pub fn with_compressed_exception_detail(compressed_data: Vec<u8>) -> Self {
        Self {
            rpc_error: Some(RpcError {
                compressed_exception_detail: Some(CompressedExceptionDetail { compressed_data }),
            }),
        }
    }

    /// The compressed exception detail at `rpc_error.compressed_exception_detail.compressed_data`
    ///
    /// Missing messages along the path are treated like their defaults, so the result is empty
    /// in that case.
    pub fn compressed_exception_detail(&self) -> &[u8] {
        self.rpc_error
            .as_ref()
            .and_then(|rpc_error| rpc_error.compressed_exception_detail.as_ref())
            .map(|detail| detail.compressed_data.as_slice())
            .unwrap_or_default()
    }

    pub fn into_compressed_exception_detail(self) -> Vec<u8> {
        self.rpc_error
            .and_then(|rpc_error| rpc_error.compressed_exception_detail)
            .map(|detail| detail.compressed_data)
            .unwrap_or_default()
    }
}
