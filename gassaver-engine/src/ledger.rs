// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::amount::{parse_units, AmountError};
use crate::common::{Amount, Scale};
use crate::error::{Error, Result};
use crate::registry::AssetRoute;
use crate::transport::Instruction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `(asset, recipient, amount)` row as entered by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLine {
    pub asset: String,
    pub recipient: String,
    pub amount: String,
}

/// Ordered batch lines, immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchRequest {
    lines: Vec<BatchLine>,
}

impl BatchRequest {
    /// Zips the three parallel input arrays into lines.
    pub fn from_arrays(
        assets: &[String],
        recipients: &[String],
        amounts: &[String],
    ) -> Result<Self> {
        if assets.len() != recipients.len() || assets.len() != amounts.len() {
            return Err(Error::InputShape {
                assets: assets.len(),
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }

        let lines = assets
            .iter()
            .zip(recipients)
            .zip(amounts)
            .map(|((asset, recipient), amount)| BatchLine {
                asset: asset.trim().to_string(),
                recipient: recipient.trim().to_string(),
                amount: amount.trim().to_string(),
            })
            .collect();

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[BatchLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<BatchLine>> for BatchRequest {
    fn from(lines: Vec<BatchLine>) -> Self {
        Self { lines }
    }
}

/// A routable line converted to units at its asset's scale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedLine {
    /// Index of the line in its [`BatchRequest`].
    pub line: usize,
    pub symbol: String,
    pub recipient: String,
    pub route: AssetRoute,
    /// Custodian address, or the chain family's native placeholder.
    pub asset_address: String,
    pub units: Amount,
}

/// Allowance owed to one custodian contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Approval {
    pub custodian: String,
    /// Symbols routed to this custodian, in first-seen order.
    pub symbols: Vec<String>,
    pub total: Amount,
}

impl Approval {
    /// Symbols joined for display, e.g. `USDT/BNB` when a mock token backs both.
    pub fn label(&self) -> String {
        self.symbols.join("/")
    }
}

/// Custodian totals in first-seen custodian order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalLedger {
    entries: Vec<Approval>,
}

impl ApprovalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, custodian: &str, symbol: &str, units: Amount) -> Result<(), AmountError> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.custodian == custodian)
        {
            Some(entry) => {
                entry.total = entry
                    .total
                    .checked_add(units)
                    .ok_or(AmountError::ExcessiveValue)?;
                if !entry.symbols.iter().any(|known| known == symbol) {
                    entry.symbols.push(symbol.to_string());
                }
            }
            None => self.entries.push(Approval {
                custodian: custodian.to_string(),
                symbols: vec![symbol.to_string()],
                total: units,
            }),
        }
        Ok(())
    }

    pub fn get(&self, custodian: &str) -> Option<Amount> {
        self.entries
            .iter()
            .find(|entry| entry.custodian == custodian)
            .map(|entry| entry.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Approval> {
        self.entries.iter()
    }

    /// Entries that need an allowance grant, i.e. with a nonzero total.
    pub fn pending(&self) -> impl Iterator<Item = &Approval> {
        self.entries.iter().filter(|entry| !entry.total.is_zero())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A line dropped because its asset has no route on the active chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub symbol: String,
}

/// Output of decimal resolution and normalization, everything needed to sign.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub lines: Vec<NormalizedLine>,
    pub ledger: ApprovalLedger,
    pub native_total: Amount,
    pub skipped: Vec<SkippedLine>,
    /// Scale each routed symbol was normalized at.
    pub scales: BTreeMap<String, Scale>,
}

impl BatchPlan {
    pub(crate) fn skip(&mut self, line: usize, symbol: &str) {
        self.skipped.push(SkippedLine {
            line,
            symbol: symbol.to_string(),
        });
    }

    /// Converts a routable line and credits it to the ledger or the native total.
    pub(crate) fn push(
        &mut self,
        line: usize,
        request_line: &BatchLine,
        route: &AssetRoute,
        scale: Scale,
        native_placeholder: &str,
    ) -> Result<()> {
        let symbol = request_line.asset.to_ascii_uppercase();
        let invalid = |source| Error::InvalidAmount {
            line,
            symbol: symbol.clone(),
            amount: request_line.amount.clone(),
            source,
        };

        let units = parse_units(&request_line.amount, scale).map_err(invalid)?;
        let asset_address = match route {
            AssetRoute::Native => {
                self.native_total = self
                    .native_total
                    .checked_add(units)
                    .ok_or(AmountError::ExcessiveValue)
                    .map_err(invalid)?;
                native_placeholder.to_string()
            }
            AssetRoute::Custodian(custodian) => {
                self.ledger
                    .credit(custodian, &symbol, units)
                    .map_err(invalid)?;
                custodian.clone()
            }
        };

        self.scales.insert(symbol.clone(), scale);
        self.lines.push(NormalizedLine {
            line,
            symbol,
            recipient: request_line.recipient.clone(),
            route: route.clone(),
            asset_address,
            units,
        });
        Ok(())
    }

    /// Sum of every normalized line's units, native included.
    pub fn total_units(&self) -> Option<Amount> {
        self.lines
            .iter()
            .try_fold(Amount::ZERO, |acc, line| acc.checked_add(line.units))
    }

    /// The single `bulkTransfer` call settling every normalized line.
    pub fn transfer_instruction(&self, settlement: &str) -> Instruction {
        Instruction::BulkTransfer {
            settlement: settlement.to_string(),
            assets: self
                .lines
                .iter()
                .map(|line| line.asset_address.clone())
                .collect(),
            recipients: self.lines.iter().map(|line| line.recipient.clone()).collect(),
            amounts: self.lines.iter().map(|line| line.units).collect(),
            value: self.native_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EVM_NATIVE_PLACEHOLDER;

    const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
    const MOCK: &str = "0xC8673dE666Ac880C4f220176588C6d368D574aaF";

    fn line(asset: &str, amount: &str) -> BatchLine {
        BatchLine {
            asset: asset.to_string(),
            recipient: "0x1111111111111111111111111111111111111111".to_string(),
            amount: amount.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn from_arrays_requires_equal_lengths() {
        let err = BatchRequest::from_arrays(
            &strings(&["USDT", "ETH"]),
            &strings(&["0x01"]),
            &strings(&["1", "2"]),
        )
        .expect_err("mismatched arrays should be rejected");
        assert_eq!(
            err,
            Error::InputShape {
                assets: 2,
                recipients: 1,
                amounts: 2
            }
        );

        let request = BatchRequest::from_arrays(&[], &[], &[]).expect("empty arrays are valid");
        assert!(request.is_empty());
    }

    #[test]
    fn ledger_keeps_first_seen_order() -> Result<(), AmountError> {
        let mut ledger = ApprovalLedger::new();
        ledger.credit(MOCK, "BNB", Amount::from(1u64))?;
        ledger.credit(USDT, "USDT", Amount::from(2u64))?;
        ledger.credit(MOCK, "MATIC", Amount::from(3u64))?;
        ledger.credit(USDT, "USDT", Amount::ZERO)?;

        let order: Vec<_> = ledger.iter().map(|entry| entry.custodian.as_str()).collect();
        assert_eq!(order, vec![MOCK, USDT]);
        assert_eq!(ledger.get(MOCK), Some(Amount::from(4u64)));
        assert_eq!(ledger.iter().next().map(Approval::label), Some("BNB/MATIC".to_string()));
        Ok(())
    }

    #[test]
    fn ledger_skips_zero_totals_when_pending() -> Result<(), AmountError> {
        let mut ledger = ApprovalLedger::new();
        ledger.credit(MOCK, "BNB", Amount::ZERO)?;
        ledger.credit(USDT, "USDT", Amount::from(7u64))?;
        let pending: Vec<_> = ledger.pending().map(|entry| entry.custodian.as_str()).collect();
        assert_eq!(pending, vec![USDT]);
        Ok(())
    }

    #[test]
    fn ledger_rejects_overflowing_totals() {
        let mut ledger = ApprovalLedger::new();
        assert!(ledger.credit(USDT, "USDT", Amount::MAX).is_ok());
        assert_eq!(
            ledger.credit(USDT, "USDT", Amount::from(1u64)),
            Err(AmountError::ExcessiveValue)
        );
    }

    #[test]
    fn plan_conserves_units() -> Result<()> {
        let usdt = AssetRoute::Custodian(USDT.to_string());
        let mock = AssetRoute::Custodian(MOCK.to_string());
        let mut plan = BatchPlan::default();

        plan.push(0, &line("USDT", "100"), &usdt, 6, EVM_NATIVE_PLACEHOLDER)?;
        plan.push(1, &line("ETH", "0.5"), &AssetRoute::Native, 18, EVM_NATIVE_PLACEHOLDER)?;
        plan.push(2, &line("usdt", "50"), &usdt, 6, EVM_NATIVE_PLACEHOLDER)?;
        plan.push(3, &line("BNB", "1.25"), &mock, 18, EVM_NATIVE_PLACEHOLDER)?;
        plan.push(4, &line("ETH", "0.000000000000000001"), &AssetRoute::Native, 18, EVM_NATIVE_PLACEHOLDER)?;

        let ledger_sum = plan
            .ledger
            .iter()
            .fold(Amount::ZERO, |acc, entry| acc + entry.total);
        assert_eq!(Some(ledger_sum + plan.native_total), plan.total_units());

        assert_eq!(plan.ledger.get(USDT), Some(Amount::from(150_000_000u64)));
        assert_eq!(
            plan.native_total,
            Amount::from(500_000_000_000_000_001u64)
        );
        assert_eq!(plan.scales.get("USDT"), Some(&6));
        Ok(())
    }

    #[test]
    fn plan_reports_invalid_amounts_with_their_line() {
        let usdt = AssetRoute::Custodian(USDT.to_string());
        let mut plan = BatchPlan::default();
        let err = plan
            .push(3, &line("USDT", "1.0000001"), &usdt, 6, EVM_NATIVE_PLACEHOLDER)
            .expect_err("too many decimals");
        assert_eq!(
            err,
            Error::InvalidAmount {
                line: 3,
                symbol: "USDT".to_string(),
                amount: "1.0000001".to_string(),
                source: AmountError::LossOfPrecision(6),
            }
        );
        assert!(plan.lines.is_empty());
    }

    #[test]
    fn transfer_instruction_uses_placeholder_for_native_lines() -> Result<()> {
        let usdt = AssetRoute::Custodian(USDT.to_string());
        let mut plan = BatchPlan::default();
        plan.push(0, &line("ETH", "1"), &AssetRoute::Native, 18, EVM_NATIVE_PLACEHOLDER)?;
        plan.push(1, &line("USDT", "2"), &usdt, 6, EVM_NATIVE_PLACEHOLDER)?;

        match plan.transfer_instruction("0xsettlement") {
            Instruction::BulkTransfer {
                settlement,
                assets,
                amounts,
                value,
                ..
            } => {
                assert_eq!(settlement, "0xsettlement");
                assert_eq!(assets, vec![EVM_NATIVE_PLACEHOLDER.to_string(), USDT.to_string()]);
                assert_eq!(
                    amounts,
                    vec![
                        Amount::from(1_000_000_000_000_000_000u64),
                        Amount::from(2_000_000u64)
                    ]
                );
                assert_eq!(value, Amount::from(1_000_000_000_000_000_000u64));
            }
            other => panic!("unexpected instruction {other:?}"),
        }
        Ok(())
    }
}
