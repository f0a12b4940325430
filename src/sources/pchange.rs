use async_trait::async_trait;
use scraper::Html;

use super::{CoinCells, TableSource, fetch_html, table_rows};
use crate::config::HttpConfig;
use crate::errors::ExtractError;
use crate::models::PriceChangeRow;

/// Rows with a 24h change (in percent) at or above this are kept.
pub const PCHANGE_THRESHOLD: f64 = 5.0;

const TBODY: &str =
    "body > div > div.main-content > div > div.listing > div.table-wrapper > table > tbody";
const METRIC: &str = "td.green";

/// Listing sorted by 24h price change, descending.
pub struct PriceChangeSource {
    client: reqwest::Client,
    url: String,
}

impl PriceChangeSource {
    pub fn new(client: reqwest::Client, config: &HttpConfig) -> Self {
        Self {
            client,
            url: config.pchange_url.clone(),
        }
    }
}

#[async_trait]
impl TableSource for PriceChangeSource {
    type Row = PriceChangeRow;

    fn name(&self) -> &'static str {
        "pchange"
    }

    async fn fetch_rows(&self) -> Result<Vec<PriceChangeRow>, ExtractError> {
        let html = fetch_html(&self.client, &self.url).await?;
        parse_rows(&html, &self.url)
    }
}

/// Extracts the rows whose 24h change meets the threshold, in page order.
pub fn parse_rows(html: &str, url: &str) -> Result<Vec<PriceChangeRow>, ExtractError> {
    let document = Html::parse_document(html);
    let cells = CoinCells::new(METRIC)?;

    let rows = table_rows(&document, TBODY, url)?
        .into_iter()
        .filter_map(|row| cells.read(row))
        .filter(|(_, _, change)| *change >= PCHANGE_THRESHOLD)
        .map(|(name, id, pchange_24h)| PriceChangeRow {
            name,
            id,
            pchange_24h,
        })
        .collect();

    Ok(rows)
}
