use crate::domain::model::Market;
use crate::utils::error::{GeoShopError, Result};
use std::collections::BTreeMap;

const fn market(
    code: &'static str,
    name: &'static str,
    flag: &'static str,
    language: &'static str,
    language_name: &'static str,
) -> Market {
    Market {
        code,
        name,
        flag,
        language,
        language_name,
    }
}

const BUILTIN_MARKETS: &[Market] = &[
    market("us", "United States", "🇺🇸", "en", "English"),
    market("uk", "United Kingdom", "🇬🇧", "en", "English"),
    market("ca", "Canada", "🇨🇦", "en", "English"),
    market("au", "Australia", "🇦🇺", "en", "English"),
    market("de", "Germany", "🇩🇪", "de", "German"),
    market("at", "Austria", "🇦🇹", "de", "German"),
    market("ch", "Switzerland", "🇨🇭", "de", "German"),
    market("fr", "France", "🇫🇷", "fr", "French"),
    market("it", "Italy", "🇮🇹", "it", "Italian"),
    market("es", "Spain", "🇪🇸", "es", "Spanish"),
    market("nl", "Netherlands", "🇳🇱", "nl", "Dutch"),
    market("pl", "Poland", "🇵🇱", "pl", "Polish"),
    market("cz", "Czech Republic", "🇨🇿", "cs", "Czech"),
    market("sk", "Slovakia", "🇸🇰", "sk", "Slovak"),
    market("hu", "Hungary", "🇭🇺", "hu", "Hungarian"),
    market("se", "Sweden", "🇸🇪", "sv", "Swedish"),
];

/// Read-only registry of supported markets, keyed by market code.
#[derive(Debug, Clone)]
pub struct MarketRegistry {
    markets: BTreeMap<&'static str, Market>,
}

impl MarketRegistry {
    pub fn builtin() -> Self {
        Self::from_markets(BUILTIN_MARKETS)
    }

    pub fn from_markets(markets: &[Market]) -> Self {
        Self {
            markets: markets.iter().map(|m| (m.code, *m)).collect(),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<Market> {
        let normalized = code.trim().to_lowercase();
        self.markets.get(normalized.as_str()).copied()
    }

    /// Like `lookup`, but an unknown code is an `InvalidMarket` error.
    pub fn resolve(&self, code: &str) -> Result<Market> {
        self.lookup(code).ok_or_else(|| GeoShopError::InvalidMarket {
            code: code.to_string(),
        })
    }

    pub fn all(&self) -> &BTreeMap<&'static str, Market> {
        &self.markets
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl Default for MarketRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
