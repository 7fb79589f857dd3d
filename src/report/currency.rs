//! Currency catalogue for display.

/// A display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// ISO 4217 code
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Minor-unit digits shown
    pub decimals: u32,
}

const fn currency(
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    decimals: u32,
) -> Currency {
    Currency {
        code,
        symbol,
        name,
        decimals,
    }
}

const CURRENCIES: &[Currency] = &[
    currency("USD", "$", "US Dollar", 2),
    currency("EUR", "€", "Euro", 2),
    currency("GBP", "£", "British Pound", 2),
    currency("JPY", "¥", "Japanese Yen", 0),
    currency("CHF", "CHF ", "Swiss Franc", 2),
    currency("CAD", "C$", "Canadian Dollar", 2),
    currency("AUD", "A$", "Australian Dollar", 2),
    currency("NZD", "NZ$", "New Zealand Dollar", 2),
    currency("CNY", "¥", "Chinese Yuan", 2),
    currency("HKD", "HK$", "Hong Kong Dollar", 2),
    currency("SGD", "S$", "Singapore Dollar", 2),
    currency("INR", "₹", "Indian Rupee", 2),
    currency("KRW", "₩", "South Korean Won", 0),
    currency("BRL", "R$", "Brazilian Real", 2),
    currency("MXN", "MX$", "Mexican Peso", 2),
    currency("ZAR", "R", "South African Rand", 2),
    currency("SEK", "kr ", "Swedish Krona", 2),
    currency("NOK", "kr ", "Norwegian Krone", 2),
    currency("TRY", "₺", "Turkish Lira", 2),
    currency("RUB", "₽", "Russian Ruble", 2),
    currency("BTC", "₿", "Bitcoin", 8),
    currency("ETH", "Ξ", "Ether", 6),
    currency("USDT", "₮", "Tether", 2),
];

/// Currency by ISO code, case-insensitive.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Currencies whose code or name contains `query` (case-insensitive).
pub fn filter_currencies(query: &str) -> Vec<&'static Currency> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return CURRENCIES.iter().collect();
    }

    CURRENCIES
        .iter()
        .filter(|c| c.code.to_lowercase().contains(&q) || c.name.to_lowercase().contains(&q))
        .collect()
}
