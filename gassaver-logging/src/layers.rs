// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    appender,
    error::{Error, Result},
    LogFormat, LogOutputDest,
};
use std::collections::BTreeMap;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self as tracing_fmt, format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    registry::LookupSpan,
    Layer, Registry,
};

/// Env var holding the CSV of logging targets.
pub const GASSAVER_LOG: &str = "GASSAVER_LOG";

const MAX_LOG_BYTES: usize = 20 * 1024 * 1024;
const UNCOMPRESSED_LOG_FILES: usize = 10;
const MAX_LOG_FILES: usize = 1000;

const ENGINE_TARGETS: [&str; 4] = [
    "gassaver",
    "gassaver_cli",
    "gassaver_engine",
    "gassaver_logging",
];
const TRANSPORT_TARGETS: [&str; 2] = ["gassaver_evm", "gassaver_tron"];

pub(crate) type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Formatting layer for `dest`, plus the writer guard when it is a directory.
pub(crate) fn output_layer(
    dest: &LogOutputDest,
    format: LogFormat,
) -> Result<(BoxedLayer, Option<WorkerGuard>)> {
    match dest {
        LogOutputDest::Stdout => Ok((formatted(format, std::io::stdout), None)),
        LogOutputDest::Stderr => Ok((formatted(format, std::io::stderr), None)),
        LogOutputDest::Path(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| Error::CreateLogDir {
                path: dir.clone(),
                source,
            })?;
            let (writer, guard) = appender::file_rotater(
                dir,
                MAX_LOG_BYTES,
                UNCOMPRESSED_LOG_FILES,
                MAX_LOG_FILES,
            );
            Ok((formatted(format, writer), Some(guard)))
        }
    }
}

fn formatted<W>(format: LogFormat, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_fmt::layer().with_ansi(false).with_writer(writer);
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Default => layer.event_format(LineFormatter).boxed(),
    }
}

/// `2024-05-01T10:00:00.123Z  INFO gassaver_engine::engine:span: fields`
struct LineFormatter;

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} {:>5} {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            metadata.level().as_str(),
            metadata.target()
        )?;
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, ":{}", span.name())?;
            }
        }
        write!(writer, ": ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Targets from `GASSAVER_LOG` when it is set, `defaults` otherwise.
pub(crate) fn targets_from_env(defaults: Vec<(String, Level)>) -> Result<Targets> {
    let targets = match std::env::var(GASSAVER_LOG) {
        Ok(value) => parse_targets(&value)?,
        Err(_) => defaults,
    };
    Ok(Targets::new().with_targets(targets))
}

/// Parses a `GASSAVER_LOG` value such as `all,alloy=debug,gassaver_tron=error`.
///
/// `all` turns every gassaver crate up to TRACE. `v` does the same but leaves
/// the transports at DEBUG. A bare target means TRACE. Named targets win over
/// the keywords wherever they appear.
pub(crate) fn parse_targets(value: &str) -> Result<Vec<(String, Level)>> {
    let mut transport_level = None;
    let mut named = BTreeMap::new();

    for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry {
            "all" => transport_level = Some(Level::TRACE),
            "v" => transport_level = transport_level.or(Some(Level::DEBUG)),
            _ => {
                let (target, level) = match entry.split_once('=') {
                    Some((target, level)) => (
                        target.trim(),
                        level
                            .trim()
                            .parse::<Level>()
                            .map_err(|_| Error::UnknownLevel(entry.to_string()))?,
                    ),
                    None => (entry, Level::TRACE),
                };
                if target.is_empty() {
                    return Err(Error::UnnamedTarget(entry.to_string()));
                }
                let _ = named.insert(target.to_string(), level);
            }
        }
    }

    let mut targets = BTreeMap::new();
    if let Some(transport_level) = transport_level {
        targets.extend(ENGINE_TARGETS.map(|target| (target.to_string(), Level::TRACE)));
        targets.extend(TRANSPORT_TARGETS.map(|target| (target.to_string(), transport_level)));
    }
    targets.extend(named);
    Ok(targets.into_iter().collect())
}
