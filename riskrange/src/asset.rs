use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Ticker prefix marking a crypto pair, eg/ "X:BTCUSD".
pub const CRYPTO_PREFIX: &str = "X:";

/// Standard equity trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year, used for assets that trade every day.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

/// Asset class of a ticker, which selects the annualization factor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[display("crypto")]
    Crypto,
    #[display("equity")]
    Equity,
}

impl AssetClass {
    /// Classify a ticker by its (case-insensitive) [`CRYPTO_PREFIX`].
    pub fn from_ticker(ticker: &str) -> Self {
        let is_crypto = ticker
            .get(..CRYPTO_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CRYPTO_PREFIX));

        if is_crypto {
            AssetClass::Crypto
        } else {
            AssetClass::Equity
        }
    }

    /// Periods per year used to annualize variance and scale risk ranges.
    pub const fn annualization_factor(self) -> f64 {
        match self {
            AssetClass::Crypto => CALENDAR_DAYS_PER_YEAR,
            AssetClass::Equity => TRADING_DAYS_PER_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_class_from_ticker() {
        struct TestCase {
            input: &'static str,
            expected: AssetClass,
        }

        let tests = vec![
            TestCase {
                // TC0: plain equity ticker
                input: "AAPL",
                expected: AssetClass::Equity,
            },
            TestCase {
                // TC1: crypto pair with upper case marker
                input: "X:BTCUSD",
                expected: AssetClass::Crypto,
            },
            TestCase {
                // TC2: crypto pair with lower case marker
                input: "x:ethusd",
                expected: AssetClass::Crypto,
            },
            TestCase {
                // TC3: marker not at the start
                input: "BTCX:USD",
                expected: AssetClass::Equity,
            },
            TestCase {
                // TC4: ticker shorter than the marker
                input: "X",
                expected: AssetClass::Equity,
            },
            TestCase {
                // TC5: multi-byte first character does not panic
                input: "é:BTC",
                expected: AssetClass::Equity,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = AssetClass::from_ticker(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_annualization_factor() {
        assert_eq!(AssetClass::Equity.annualization_factor(), 252.0);
        assert_eq!(AssetClass::Crypto.annualization_factor(), 365.25);
    }
}
