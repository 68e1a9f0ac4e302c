// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use clap::Parser;
use gassaver_engine::ChainId;
use gassaver_logging::{LogFormat, LogOutputDest};
use std::str::FromStr;

use crate::commands::SubCmd;

// Please do not remove the blank lines in these doc comments.
// They are used for inserting line breaks when the help menu is rendered in the UI.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Opt {
    /// Specify the logging output destination.
    ///
    /// Valid values are "stdout", "stderr", "data-dir", or a custom path.
    ///
    /// `data-dir` is the default value.
    ///
    /// The data directory location is platform specific:
    ///  - Linux: $HOME/.local/share/gassaver/logs
    ///  - macOS: $HOME/Library/Application Support/gassaver/logs
    ///  - Windows: C:\Users\<username>\AppData\Roaming\gassaver\logs
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, value_parser = LogOutputDest::from_str, verbatim_doc_comment, default_value = "data-dir")]
    pub log_output_dest: LogOutputDest,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    ///
    /// `default` is the default value.
    #[clap(long, value_parser = LogFormat::from_str, verbatim_doc_comment, default_value = "default")]
    pub log_format: LogFormat,

    /// Chain to operate on, e.g. "evm:11155111" or "tron:nile".
    ///
    /// Takes precedence over the GASSAVER_CHAIN env var.
    #[clap(long, global = true, value_parser = ChainId::from_str, verbatim_doc_comment)]
    pub chain: Option<ChainId>,

    /// Available sub commands.
    #[clap(subcommand)]
    pub command: SubCmd,
}
