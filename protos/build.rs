// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

const INCLUDES: &[&str] = &["proto"];

const PROTOS: &[&str] = &[
    "proto/crpc/v1/rpc_error.proto",
    "proto/exception/v1/exception.proto",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
    }

    // SAFETY: build scripts run single threaded
    unsafe { std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?) };

    // Messages only, the payloads are carried in metadata of other services.
    tonic_prost_build::configure()
        .build_client(false)
        .build_server(false)
        .compile_protos(PROTOS, INCLUDES)?;

    Ok(())
}
