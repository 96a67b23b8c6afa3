// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Protobuf definitions of the structured error payloads attached to failed gRPC calls
//!
//! * [`crpc::v1`] contains the envelope which is put into the trailing metadata.
//! * [`exception::v1`] contains the application level exception carried in the envelope.

pub mod crpc;
pub mod exception;
