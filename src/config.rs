//! Runtime configuration shared by every request.

use std::time::Duration;

/// How amounts are shown to the user.
///
/// The analysis itself never looks at this, it is only handed to the views
/// and charts at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// BCP 47 language tag used by charts, e.g. "pt-BR".
    pub locale: String,
    /// ISO 4217 currency code used by charts, e.g. "BRL".
    pub currency_code: String,
    /// The symbol put in front of amounts in tables and cards, e.g. "R$".
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_owned(),
            currency_code: "BRL".to_owned(),
            currency_symbol: "R$".to_owned(),
        }
    }
}

impl DisplayConfig {
    /// Whether amounts are written with a decimal comma and dots between
    /// thousands, as in "1.234,56".
    pub fn uses_decimal_comma(&self) -> bool {
        const DECIMAL_COMMA_LANGUAGES: [&str; 6] = ["pt", "es", "de", "it", "nl", "id"];

        let language = self.locale.split(['-', '_']).next().unwrap_or_default();
        DECIMAL_COMMA_LANGUAGES.contains(&language.to_ascii_lowercase().as_str())
    }

    /// The body of a JavaScript function taking `number` and returning it
    /// formatted as currency, for use as an ECharts axis label formatter.
    pub fn currency_formatter_js(&self) -> String {
        format!(
            "return new Intl.NumberFormat({:?}, {{ style: 'currency', currency: {:?} }}).format(number);",
            self.locale, self.currency_code
        )
    }
}

/// Settings for the per-browser upload sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a session may sit idle before its upload is discarded.
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// The application configuration, built from the command line arguments of
/// the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Currency and locale settings for the views.
    pub display: DisplayConfig,
    /// Upload session settings.
    pub session: SessionConfig,
    /// The largest request body accepted by the upload endpoint.
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            session: SessionConfig::default(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
