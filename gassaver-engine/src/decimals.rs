// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::chain::ChainId;
use crate::common::Scale;
use crate::config::ScaleHeuristic;
use crate::registry::AssetRoute;
use crate::transport::ChainTransport;
use std::collections::HashMap;

/// Resolves and memoizes the scale of every asset touched by one batch.
///
/// A resolver lives for a single batch. Each symbol is resolved at most once,
/// and a failed `decimals()` query falls back to the heuristic instead of
/// failing the batch.
pub struct DecimalResolver<'a, T: ChainTransport + ?Sized> {
    transport: &'a T,
    chain: ChainId,
    heuristic: &'a ScaleHeuristic,
    resolved: HashMap<String, Scale>,
}

impl<'a, T: ChainTransport + ?Sized> DecimalResolver<'a, T> {
    pub fn new(transport: &'a T, chain: ChainId, heuristic: &'a ScaleHeuristic) -> Self {
        Self {
            transport,
            chain,
            heuristic,
            resolved: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, symbol: &str, route: &AssetRoute) -> Scale {
        let key = symbol.trim().to_ascii_uppercase();
        if let Some(scale) = self.resolved.get(&key) {
            return *scale;
        }

        let scale = match route {
            AssetRoute::Native => self.chain.family().native_scale(),
            AssetRoute::Custodian(custodian) => {
                match self.transport.query_decimals(custodian).await {
                    Ok(scale) => {
                        debug!("Resolved {key} at {custodian} to {scale} decimals");
                        scale
                    }
                    Err(err) => {
                        let fallback = self.heuristic.scale_for(self.chain, &key);
                        warn!(
                            "Failed to query decimals of {key} at {custodian}: {err}, assuming {fallback}"
                        );
                        fallback
                    }
                }
            }
        };

        self.resolved.insert(key, scale);
        scale
    }

    /// Number of symbols resolved so far.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TronNetwork;
    use crate::transport::{MockChainTransport, TransportError};
    use mockall::predicate::eq;
    use tracing_test::traced_test;

    fn custodian(address: &str) -> AssetRoute {
        AssetRoute::Custodian(address.to_string())
    }

    #[tokio::test]
    async fn queries_each_symbol_once() {
        let mut transport = MockChainTransport::new();
        transport
            .expect_query_decimals()
            .with(eq("0xdac1"))
            .times(1)
            .returning(|_| Ok(6));
        let heuristic = ScaleHeuristic::default();
        let mut resolver = DecimalResolver::new(&transport, ChainId::ETHEREUM, &heuristic);

        for symbol in ["USDT", "usdt", " USDT "] {
            assert_eq!(resolver.resolve(symbol, &custodian("0xdac1")).await, 6);
        }
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn native_assets_use_family_scale() {
        let mut transport = MockChainTransport::new();
        transport.expect_query_decimals().never();
        let heuristic = ScaleHeuristic::default();

        let mut resolver = DecimalResolver::new(&transport, ChainId::ETHEREUM, &heuristic);
        assert_eq!(resolver.resolve("ETH", &AssetRoute::Native).await, 18);

        let nile = ChainId::Tron(TronNetwork::Nile);
        let mut resolver = DecimalResolver::new(&transport, nile, &heuristic);
        assert_eq!(resolver.resolve("TRX", &AssetRoute::Native).await, 6);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_query_falls_back_to_heuristic() {
        let mut transport = MockChainTransport::new();
        transport
            .expect_query_decimals()
            .returning(|_| Err(TransportError::Rpc("connection refused".to_string())));
        let heuristic = ScaleHeuristic::default();

        let mut resolver = DecimalResolver::new(&transport, ChainId::SEPOLIA, &heuristic);
        assert_eq!(resolver.resolve("USDC", &custodian("0x01")).await, 6);
        assert_eq!(resolver.resolve("LINK", &custodian("0x02")).await, 18);

        let mut resolver = DecimalResolver::new(&transport, ChainId::BNB_SMART_CHAIN, &heuristic);
        assert_eq!(resolver.resolve("USDT", &custodian("0x03")).await, 18);

        assert!(logs_contain("Failed to query decimals of USDC"));
    }
}
