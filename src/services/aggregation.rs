// Per-asset aggregation of flat balance records.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{AggregatedAsset, BalanceRecord};

/// Groups records by `(symbol, name)` and ranks the groups by USD net worth.
///
/// The first record seen for an asset is its representative: logo, price-feed
/// id, asset type/address and price all come from it. Amounts include
/// delegated units. Assets worth `min_net_worth` or less are dropped.
pub fn aggregate(records: &[BalanceRecord], min_net_worth: Decimal) -> Vec<AggregatedAsset> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut groups: HashMap<(&str, &str), Vec<&BalanceRecord>> = HashMap::new();

    for record in records {
        let key = record.identity_key();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut assets: Vec<AggregatedAsset> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(build_asset)
        .collect();

    // Vec::sort_by is stable, so equal net worth keeps discovery order
    assets.sort_by(|a, b| b.net_worth_usd.cmp(&a.net_worth_usd));
    assets.retain(|asset| asset.net_worth_usd > min_net_worth);
    assets
}

/// Headline figure for a portfolio.
pub fn total_net_worth(assets: &[AggregatedAsset]) -> Decimal {
    assets.iter().map(|asset| asset.net_worth_usd).sum()
}

fn build_asset(group: Vec<&BalanceRecord>) -> Option<AggregatedAsset> {
    let representative = *group.first()?;
    let total_amount: Decimal = group.iter().map(|record| record.held_amount()).sum();
    let net_worth_usd = representative
        .price_usd
        .map(|price| total_amount * price)
        .unwrap_or(Decimal::ZERO);

    Some(AggregatedAsset {
        symbol: representative.symbol.clone(),
        name: representative.name.clone(),
        logo: representative.logo_uri.clone(),
        coin_gecko_id: representative.coin_gecko_id.clone(),
        asset_type: representative.asset_type.clone(),
        asset_address: representative.asset_address.clone(),
        total_amount,
        price_usd: representative.price_usd,
        net_worth_usd,
        source_records: group.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MINIMAL_NET_WORTH;
    use crate::models::{Network, WalletAddress};
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn record(
        symbol: &str,
        name: &str,
        network: Network,
        amount: &str,
        price: Option<&str>,
    ) -> BalanceRecord {
        BalanceRecord {
            wallet_address: WalletAddress::new("wallet"),
            network,
            symbol: symbol.to_string(),
            name: name.to_string(),
            logo_uri: None,
            coin_gecko_id: None,
            amount: dec(amount),
            delegated_amount: Decimal::ZERO,
            price_usd: price.map(dec),
            asset_address: None,
            asset_type: None,
        }
    }

    #[test]
    fn sums_across_networks_with_representative_price() {
        let records = vec![
            record("X", "Token X", Network::Ethereum, "10", Some("2")),
            record("X", "Token X", Network::Klaytn, "5", None),
        ];
        let assets = aggregate(&records, MINIMAL_NET_WORTH);

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].total_amount, dec("15"));
        // Only the representative's price is used
        assert_eq!(assets[0].net_worth_usd, dec("30"));
        assert_eq!(assets[0].source_records.len(), 2);
    }

    #[test]
    fn unpriced_representative_is_worth_nothing() {
        let records = vec![
            record("X", "Token X", Network::Klaytn, "5", None),
            record("X", "Token X", Network::Ethereum, "10", Some("2")),
        ];
        assert!(aggregate(&records, MINIMAL_NET_WORTH).is_empty());
        assert_eq!(aggregate(&records, Decimal::NEGATIVE_ONE)[0].net_worth_usd, Decimal::ZERO);
    }

    #[test]
    fn delegated_amounts_count_towards_total() {
        let mut staked = record("ATOM", "Cosmos Hub", Network::CosmosHub, "10", Some("2"));
        staked.delegated_amount = dec("5");
        let assets = aggregate(&[staked], MINIMAL_NET_WORTH);

        assert_eq!(assets[0].total_amount, dec("15"));
        assert_eq!(assets[0].net_worth_usd, dec("30"));
    }

    #[test]
    fn dust_is_filtered() {
        let records = vec![
            record("A", "Dust", Network::Ethereum, "0.00005", Some("1")),
            record("B", "Small", Network::Ethereum, "0.0002", Some("1")),
            record("C", "Edge", Network::Ethereum, "0.0001", Some("1")),
        ];
        let assets = aggregate(&records, MINIMAL_NET_WORTH);

        let symbols: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B"]);
    }

    #[test]
    fn sorted_descending_by_net_worth() {
        let records = vec![
            record("A", "A", Network::Ethereum, "5", Some("1")),
            record("B", "B", Network::Ethereum, "50", Some("1")),
            record("C", "C", Network::Ethereum, "0.5", Some("1")),
        ];
        let worths: Vec<Decimal> = aggregate(&records, MINIMAL_NET_WORTH)
            .iter()
            .map(|a| a.net_worth_usd)
            .collect();
        assert_eq!(worths, vec![dec("50"), dec("5"), dec("0.5")]);
    }

    #[test]
    fn equal_net_worth_keeps_discovery_order() {
        let records = vec![
            record("B", "B", Network::Ethereum, "1", Some("1")),
            record("A", "A", Network::Ethereum, "1", Some("1")),
        ];
        let symbols: Vec<String> = aggregate(&records, MINIMAL_NET_WORTH)
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["B", "A"]);
    }

    #[test]
    fn aggregation_is_idempotent_over_source_records() {
        let records = vec![
            record("X", "Token X", Network::Ethereum, "10", Some("2")),
            record("Y", "Token Y", Network::Ethereum, "3", Some("4")),
            record("X", "Token X", Network::Klaytn, "5", None),
        ];
        let first = aggregate(&records, MINIMAL_NET_WORTH);
        let flattened: Vec<BalanceRecord> = first
            .iter()
            .flat_map(|asset| asset.source_records.iter().cloned())
            .collect();
        let second = aggregate(&flattened, MINIMAL_NET_WORTH);

        assert_eq!(first, second);
    }

    #[test]
    fn distinct_tokens_sharing_symbol_and_name_collide() {
        // Identity is (symbol, name); contract address does not split groups
        let mut bridged = record("USDC", "USD Coin", Network::Ethereum, "1", Some("1"));
        bridged.asset_address = Some("0xa0b8".to_string());
        let mut other = record("USDC", "USD Coin", Network::Klaytn, "2", Some("1"));
        other.asset_address = Some("0x6540".to_string());

        let assets = aggregate(&[bridged, other], MINIMAL_NET_WORTH);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].total_amount, dec("3"));
        assert_eq!(assets[0].asset_address.as_deref(), Some("0xa0b8"));
    }

    #[test]
    fn total_net_worth_sums_assets() {
        let records = vec![
            record("A", "A", Network::Ethereum, "5", Some("1")),
            record("B", "B", Network::Ethereum, "50", Some("1")),
        ];
        let assets = aggregate(&records, MINIMAL_NET_WORTH);
        assert_eq!(total_net_worth(&assets), dec("55"));
        assert_eq!(total_net_worth(&[]), Decimal::ZERO);
    }
}
