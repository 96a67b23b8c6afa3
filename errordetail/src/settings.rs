// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use config::{Config, ConfigError, File, FileFormat, Source};
use flate2::Compression;
use serde::Deserialize;

/// Configuration for extracting and attaching exception details.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Upper bound of the decompressed exception detail in bytes
    ///
    /// Protects against decompression bombs. `null` disables the limit.
    ///
    /// Default is 16 MiB.
    #[serde(default = "default_max_decompressed_size")]
    pub max_decompressed_size: Option<usize>,
    /// zlib compression level used when attaching exception details, between 0 and 9
    ///
    /// Default is 6.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_decompressed_size: default_max_decompressed_size(),
            compression_level: default_compression_level(),
        }
    }
}

impl Settings {
    pub fn compression(&self) -> Compression {
        Compression::new(self.compression_level.min(9))
    }
}

fn default_max_decompressed_size() -> Option<usize> {
    Some(16 * 1024 * 1024)
}

fn default_compression_level() -> u32 {
    6
}

/// Loads the settings from a YAML file.
pub fn get_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    build_settings(File::from(path.as_ref()).format(FileFormat::Yaml))
}

fn build_settings(source: impl Source + Send + Sync + 'static) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(source)
        .build()?
        .try_deserialize()
}
