use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{ElementRef, Html, Selector};

use crate::config::HttpConfig;
use crate::errors::ExtractError;

pub mod funding;
pub mod pchange;

pub use funding::FundingSource;
pub use pchange::PriceChangeSource;

/// One scraped listing page. Everything about the page markup stays behind
/// this trait.
#[async_trait]
pub trait TableSource: Send + Sync {
    type Row: Send;

    fn name(&self) -> &'static str;

    /// Fetches the page and returns the rows passing this source's threshold,
    /// in page order.
    async fn fetch_rows(&self) -> Result<Vec<Self::Row>, ExtractError>;
}

/// Runs one extraction, turning any failure into an empty row set so the
/// other source and the rest of the cycle still run.
pub async fn extract_or_empty<S>(source: &S) -> Vec<S::Row>
where
    S: TableSource + ?Sized,
{
    match source.fetch_rows().await {
        Ok(rows) => {
            tracing::info!("[{}] {} rows passed the threshold", source.name(), rows.len());
            rows
        }
        Err(e) => {
            tracing::error!("[{}] extraction failed: {}", source.name(), e);
            Vec::new()
        }
    }
}

/// Builds the HTTP client shared by both sources.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, ExtractError> {
    let mut headers = HeaderMap::new();
    if let Ok(referer) = HeaderValue::from_str(&config.referer) {
        headers.insert(header::REFERER, referer);
    } else {
        tracing::warn!("Ignoring invalid Referer header: {}", config.referer);
    }

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout)
        .build()?;

    Ok(client)
}

/// GET the page and return its body, treating non-2xx as failure.
async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Ok(body)
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// Cell selectors shared by both listings.
struct CoinCells {
    metric: Selector,
    name: Selector,
    id: Selector,
}

impl CoinCells {
    fn new(metric_css: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            metric: selector(metric_css)?,
            name: selector("td.coin-name > a > span:nth-of-type(1)")?,
            id: selector("td.coin-name > a > span:nth-of-type(2)")?,
        })
    }

    /// Name, id and parsed metric of a row, or None if any is missing or the
    /// metric is not numeric.
    fn read(&self, row: ElementRef<'_>) -> Option<(String, String, f64)> {
        let metric = first_text(row, &self.metric)?;
        let name = first_text(row, &self.name)?;
        let id = first_text(row, &self.id)?;

        let Some(value) = parse_metric(&metric) else {
            tracing::trace!("skipping {id}: unparseable metric {metric:?}");
            return None;
        };

        Some((name, id, value))
    }
}

/// Rows of the single data table body, or `MissingTable` if it is absent.
fn table_rows<'a>(
    document: &'a Html,
    tbody_css: &str,
    url: &str,
) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let tbody_sel = selector(tbody_css)?;
    let tr_sel = selector("tr")?;

    let tbody = document
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| ExtractError::MissingTable(url.to_string()))?;

    Ok(tbody.select(&tr_sel).collect())
}

fn first_text(row: ElementRef<'_>, sel: &Selector) -> Option<String> {
    row.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Normalizes a metric cell: trims, drops a trailing `%`, accepts a decimal
/// comma. `"-0,05 %"` parses as `-0.05`.
pub fn parse_metric(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix('%').unwrap_or(text).trim();
    text.replace(',', ".").parse::<f64>().ok()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decorated_metrics() {
        assert_eq!(parse_metric("-0.05"), Some(-0.05));
        assert_eq!(parse_metric("  -0,12% "), Some(-0.12));
        assert_eq!(parse_metric("7,3 %"), Some(7.3));
        assert_eq!(parse_metric("+12.5%"), Some(12.5));
    }

    #[test]
    fn rejects_non_numeric_metrics() {
        assert_eq!(parse_metric(""), None);
        assert_eq!(parse_metric("%"), None);
        assert_eq!(parse_metric("n/a"), None);
    }

    #[test]
    fn normalizing_is_idempotent() {
        for raw in ["-0,05%", " 5 % ", "12.75", "-0.049"] {
            let once = parse_metric(raw).unwrap();
            assert_eq!(parse_metric(&once.to_string()), Some(once));
        }
    }

    #[test]
    fn missing_table_is_an_error() {
        let doc = Html::parse_document("<html><body><p>maintenance</p></body></html>");
        let err = table_rows(&doc, "body > div > table > tbody", "https://x").unwrap_err();
        assert!(matches!(err, ExtractError::MissingTable(_)));
    }
}
