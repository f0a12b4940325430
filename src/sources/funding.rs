use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::{CoinCells, TableSource, fetch_html, selector, table_rows};
use crate::config::HttpConfig;
use crate::errors::ExtractError;
use crate::models::FundingRow;

/// Rows at or below this funding rate (in percent) are kept.
pub const FUNDING_THRESHOLD: f64 = -0.05;

const TBODY: &str = "body > div.body-wrapper > div.main-content > div > div.listing > div.table-wrapper > table > tbody";
const METRIC: &str = "td.red";
const LINK: &str = "td:nth-child(1) > div > ul > li:nth-child(2) > a";

/// Listing sorted by average funding rate, ascending.
pub struct FundingSource {
    client: reqwest::Client,
    url: String,
    site_origin: Url,
}

impl FundingSource {
    pub fn new(client: reqwest::Client, config: &HttpConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            client,
            url: config.funding_url.clone(),
            site_origin: Url::parse(&config.site_origin)?,
        })
    }
}

#[async_trait]
impl TableSource for FundingSource {
    type Row = FundingRow;

    fn name(&self) -> &'static str {
        "funding"
    }

    async fn fetch_rows(&self) -> Result<Vec<FundingRow>, ExtractError> {
        let html = fetch_html(&self.client, &self.url).await?;
        parse_rows(&html, &self.url, &self.site_origin)
    }
}

/// Extracts the funding rows at or below the threshold, in page order.
pub fn parse_rows(html: &str, url: &str, site_origin: &Url) -> Result<Vec<FundingRow>, ExtractError> {
    let document = Html::parse_document(html);
    let cells = CoinCells::new(METRIC)?;
    let link_sel = selector(LINK)?;

    let rows = table_rows(&document, TBODY, url)?
        .into_iter()
        .filter_map(|row| {
            let link = absolute_link(link_href(row, &link_sel)?, site_origin)?;
            let (name, id, funding_rate) = cells.read(row)?;
            Some(FundingRow {
                name,
                id,
                funding_rate,
                link: Some(link),
            })
        })
        .filter(|row| row.funding_rate <= FUNDING_THRESHOLD)
        .collect();

    Ok(rows)
}

fn link_href<'a>(row: scraper::ElementRef<'a>, sel: &Selector) -> Option<&'a str> {
    row.select(sel).next()?.value().attr("href")
}

/// Absolute hrefs pass through; anything else is resolved against the site
/// origin. None when the href cannot be resolved.
fn absolute_link(href: &str, site_origin: &Url) -> Option<String> {
    let href = href.trim();
    if href.starts_with("http") {
        return Some(href.to_string());
    }

    match site_origin.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::trace!("skipping unresolvable link {href:?}: {e}");
            None
        }
    }
}
