#[derive(Debug, Clone)]
pub struct Config {
    /// Reporting currency assumed for tenants with none configured. Passed
    /// explicitly into the currency context loader rather than read as a
    /// hidden constant, so deployments can override it.
    pub default_currency: String,
    /// Upper bound on rows accepted from a single warehouse query.
    pub max_report_rows: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            default_currency: std::env::var("CARTLYTICS_DEFAULT_CURRENCY")
                .unwrap_or_else(|_| "USD".to_string())
                .to_uppercase(),
            max_report_rows: std::env::var("CARTLYTICS_MAX_REPORT_ROWS")
                .unwrap_or_else(|_| "50000".to_string())
                .parse()
                .map_err(|e| format!("invalid CARTLYTICS_MAX_REPORT_ROWS: {e}"))?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            max_report_rows: 50_000,
        }
    }
}
