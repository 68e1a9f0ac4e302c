// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::signers::local::PrivateKeySigner;
use color_eyre::eyre::{Context, Result};
use color_eyre::Section;
use gassaver_evm::wallet::signer_from_private_key;
use std::env;
use std::fs;

const SECRET_KEY_ENV: &str = "SECRET_KEY";
const SECRET_KEY_FILE: &str = "secret_key";

/// Signing key shared by both chain families, secp256k1 in either case.
pub fn load_signer() -> Result<PrivateKeySigner> {
    let secret_key =
        get_secret_key().wrap_err("The secret key is required to perform this action")?;
    signer_from_private_key(&secret_key)
        .wrap_err("Failed to load signing key")
        .with_suggestion(|| "the secret key should be a hex encoded secp256k1 private key")
}

/// Private key from `SECRET_KEY`, or from the data-dir `secret_key` file.
pub fn get_secret_key() -> Result<String> {
    let why_env_failed = match env::var(SECRET_KEY_ENV) {
        Ok(key) => return Ok(key),
        Err(e) => e,
    };

    let dir = super::data_dir::get_client_data_dir_path()
        .wrap_err(format!("Failed to obtain secret key from env var: {why_env_failed}, reading from disk also failed as couldn't access data dir"))
        .with_suggestion(|| format!("make sure you've provided the {SECRET_KEY_ENV} env var"))?;

    let key_path = dir.join(SECRET_KEY_FILE);
    fs::read_to_string(&key_path)
        .wrap_err("Failed to read secret key from file")
        .with_suggestion(|| format!("make sure you've provided the {SECRET_KEY_ENV} env var or have the key in a file at {key_path:?}"))
}
