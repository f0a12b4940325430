/// A row from the funding-rate listing that passed the funding threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingRow {
    pub name: String,
    pub id: String,
    pub funding_rate: f64,
    pub link: Option<String>,
}

/// A row from the 24h price-change listing that passed the change threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChangeRow {
    pub name: String,
    pub id: String,
    pub pchange_24h: f64,
}

/// An asset present in both listings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub name: String,
    pub id: String,
    pub funding_rate: f64,
    pub pchange_24h: f64,
    pub link: String,
}

impl MatchedRecord {
    /// Identity used for change tracking, always lowercase.
    pub fn key(&self) -> String {
        self.id.to_lowercase()
    }
}
