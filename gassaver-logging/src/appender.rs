// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use std::{
    env,
    ffi::OsStr,
    fmt::{self, Debug},
    io::{self, Write},
    path::Path,
};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

const DEFAULT_FILE_STEM: &str = "gassaver";

/// Non-blocking writer over a size-rotated log file in `dir`.
///
/// `uncompressed_files` should be lower than `max_files` for older files to get compressed.
/// Files beyond `max_files` are deleted.
pub(super) fn file_rotater(
    dir: &Path,
    max_bytes: usize,
    uncompressed_files: usize,
    max_files: usize,
) -> (NonBlocking, WorkerGuard) {
    let file_stem = env::current_exe()
        .map(|path| {
            path.file_stem()
                .unwrap_or(OsStr::new(DEFAULT_FILE_STEM))
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|_| DEFAULT_FILE_STEM.to_string());

    let writer = FileRotate::new(
        dir.join(format!("{file_stem}.log")),
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::OnRotate(uncompressed_files),
        #[cfg(unix)]
        None,
    );

    // Batch outcomes must not be dropped, exert backpressure instead.
    NonBlockingBuilder::default()
        .lossy(false)
        .finish(RotatingFile { writer })
}

/// Keeps the newest log under a stable name so it can be followed with `tail -f`.
struct RotatingFile {
    writer: FileRotate<AppendTimestamp>,
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Debug for RotatingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingFile").finish()
    }
}
