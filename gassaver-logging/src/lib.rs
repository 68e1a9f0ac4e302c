// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Log output of the `gassaver` binary.
//!
//! Levels come from `GASSAVER_LOG` when it is set and from the binary's own
//! defaults otherwise. File output is size-rotated inside one directory per run.

mod appender;
mod error;
mod layers;

use crate::error::Result;
use std::{
    fmt::{self, Display, Formatter},
    path::PathBuf,
    str::FromStr,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub use error::Error;
pub use layers::GASSAVER_LOG;
pub use tracing_appender::non_blocking::WorkerGuard;
pub use tracing_core::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutputDest {
    Stderr,
    Stdout,
    /// Directory holding the rotated log files, created on install.
    Path(PathBuf),
}

impl LogOutputDest {
    /// A fresh `gassaver/logs/log_<timestamp>` directory under the platform data dir.
    pub fn data_dir() -> Result<Self> {
        let base = dirs_next::data_dir().ok_or(Error::NoDataDir)?;
        let run = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        Ok(Self::Path(
            base.join("gassaver").join("logs").join(format!("log_{run}")),
        ))
    }
}

impl FromStr for LogOutputDest {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "data-dir" => Self::data_dir(),
            dir => Ok(Self::Path(PathBuf::from(dir))),
        }
    }
}

impl Display for LogOutputDest {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Stderr => write!(f, "stderr"),
            Self::Stdout => write!(f, "stdout"),
            Self::Path(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event: time, level, target, spans, fields.
    #[default]
    Default,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "default" => Ok(Self::Default),
            "json" => Ok(Self::Json),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub output: LogOutputDest,
    pub format: LogFormat,
    /// Used when `GASSAVER_LOG` is unset.
    pub default_targets: Vec<(String, Level)>,
}

impl LogSettings {
    /// Installs the global subscriber.
    ///
    /// File output is written by a background worker. The returned guard
    /// flushes it on drop and has to be held until the program exits.
    pub fn install(self) -> Result<Option<WorkerGuard>> {
        let targets = layers::targets_from_env(self.default_targets)?;
        let (layer, guard) = layers::output_layer(&self.output, self.format)?;
        tracing_subscriber::registry()
            .with(layer.with_filter(targets))
            .try_init()?;

        tracing::debug!("Logging to {} in {} format", self.output, self.format);
        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    #[test]
    fn output_dest_parses_streams_and_directories() -> Result<()> {
        assert_eq!("stdout".parse::<LogOutputDest>()?, LogOutputDest::Stdout);
        assert_eq!("stderr".parse::<LogOutputDest>()?, LogOutputDest::Stderr);
        assert_eq!(
            "/tmp/gassaver-logs".parse::<LogOutputDest>()?,
            LogOutputDest::Path(PathBuf::from("/tmp/gassaver-logs"))
        );
        Ok(())
    }

    #[test]
    fn data_dir_gets_one_directory_per_run() -> Result<()> {
        // Not every CI container has a data dir.
        let Ok(LogOutputDest::Path(dir)) = LogOutputDest::data_dir() else {
            return Ok(());
        };
        let run = dir.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        assert!(run.starts_with("log_"), "{run}");
        assert!(dir.ends_with(PathBuf::from("gassaver").join("logs").join(run)));
        Ok(())
    }

    #[test]
    fn format_accepts_default_and_json_only() -> Result<()> {
        assert_eq!("json".parse::<LogFormat>()?, LogFormat::Json);
        assert_eq!("default".parse::<LogFormat>()?, LogFormat::Default);
        assert!(matches!(
            "yaml".parse::<LogFormat>(),
            Err(Error::UnknownFormat(format)) if format == "yaml"
        ));
        assert_eq!(LogFormat::Json.to_string(), "json");
        Ok(())
    }
}
