// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::Result;
use gassaver_logging::{Level, LogSettings, WorkerGuard};

use crate::opt::Opt;

/// The returned guard flushes file logs on drop and must outlive the command.
pub fn init_logging(opt: &Opt) -> Result<Option<WorkerGuard>> {
    let settings = LogSettings {
        output: opt.log_output_dest.clone(),
        format: opt.log_format,
        default_targets: vec![
            ("gassaver".to_string(), Level::TRACE),
            ("gassaver_engine".to_string(), Level::TRACE),
            ("gassaver_evm".to_string(), Level::DEBUG),
            ("gassaver_tron".to_string(), Level::DEBUG),
            ("gassaver_logging".to_string(), Level::TRACE),
        ],
    };
    Ok(settings.install()?)
}
