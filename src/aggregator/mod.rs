use crate::models::{FundingRow, MatchedRecord, PriceChangeRow};

/// Link used when the funding row carried none.
pub const PLACEHOLDER_LINK: &str = "#";

/// Joins the two listings. Each funding row pairs with the first price-change
/// row whose id or name matches ignoring case; unmatched funding rows are
/// dropped. Output keeps the funding rows' order.
pub fn aggregate(funding: &[FundingRow], pchange: &[PriceChangeRow]) -> Vec<MatchedRecord> {
    let pchange_keys: Vec<(String, String)> = pchange
        .iter()
        .map(|p| (p.id.to_lowercase(), p.name.to_lowercase()))
        .collect();

    funding
        .iter()
        .filter_map(|f| {
            let id = f.id.to_lowercase();
            let name = f.name.to_lowercase();
            let idx = pchange_keys
                .iter()
                .position(|(pid, pname)| *pid == id || *pname == name)?;

            Some(MatchedRecord {
                name: f.name.clone(),
                id: f.id.clone(),
                funding_rate: f.funding_rate,
                pchange_24h: pchange[idx].pchange_24h,
                link: f
                    .link
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER_LINK.to_string()),
            })
        })
        .collect()
}
