// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Amount, Scale};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Lost precision: more than {0} fractional digits")]
    LossOfPrecision(Scale),
    #[error("The amount would exceed the maximum value")]
    ExcessiveValue,
    #[error("Failed to parse amount: {0}")]
    InvalidFormat(String),
}

/// Converts a human decimal string into raw units at the given scale.
///
/// The conversion is exact. Trailing fractional zeros are ignored, any other
/// digit beyond `scale` is rejected rather than truncated.
pub fn parse_units(value: &str, scale: Scale) -> Result<Amount, AmountError> {
    if value.is_empty() {
        return Err(AmountError::InvalidFormat("empty amount".to_string()));
    }

    let (units_str, remainder_str) = value.split_once('.').unwrap_or((value, ""));

    if units_str.is_empty() && remainder_str.is_empty() {
        return Err(AmountError::InvalidFormat(format!("{value:?} has no digits")));
    }
    if !is_digits(units_str) || !is_digits(remainder_str) {
        return Err(AmountError::InvalidFormat(format!(
            "{value:?} is not a plain decimal number"
        )));
    }

    let multiplier = Amount::from(10u64)
        .checked_pow(Amount::from(scale))
        .ok_or(AmountError::ExcessiveValue)?;

    let converted_units = if units_str.is_empty() {
        Amount::ZERO
    } else {
        units_str
            .parse::<Amount>()
            .map_err(|_| AmountError::ExcessiveValue)?
            .checked_mul(multiplier)
            .ok_or(AmountError::ExcessiveValue)?
    };

    let remainder = {
        let remainder_str = remainder_str.trim_end_matches('0');

        if remainder_str.is_empty() {
            Amount::ZERO
        } else {
            let remainder_conversion = (scale as usize)
                .checked_sub(remainder_str.len())
                .ok_or(AmountError::LossOfPrecision(scale))?;
            let parsed_remainder = remainder_str
                .parse::<Amount>()
                .map_err(|_| AmountError::ExcessiveValue)?;
            parsed_remainder
                .checked_mul(Amount::from(10u64).pow(Amount::from(remainder_conversion)))
                .ok_or(AmountError::ExcessiveValue)?
        }
    };

    converted_units
        .checked_add(remainder)
        .ok_or(AmountError::ExcessiveValue)
}

/// Renders raw units back as a decimal string, trimming trailing zeros.
pub fn format_units(amount: Amount, scale: Scale) -> String {
    let divisor = Amount::from(10u64).pow(Amount::from(scale));
    let unit = amount / divisor;
    let remainder = amount % divisor;
    if remainder.is_zero() {
        return unit.to_string();
    }
    let digits = remainder.to_string();
    let fraction = format!("{digits:0>width$}", width = scale as usize);
    format!("{unit}.{}", fraction.trim_end_matches('0'))
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}
