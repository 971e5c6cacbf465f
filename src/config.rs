use crate::engine::Promotion;

/// How the console driver prints the position after each move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Text board diagram.
    Text,
    /// One JSON `GameSnapshot` per line.
    Json,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Console configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Position output format.
    pub output: OutputFormat,
    /// Piece a pawn promotes to when the move names none.
    pub default_promotion: Promotion,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            log_filter: lookup("CHESS_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            output: lookup("CHESS_OUTPUT")
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(defaults.output),
            default_promotion: lookup("CHESS_DEFAULT_PROMOTION")
                .and_then(|v| Promotion::from_str_loose(v.trim()).ok())
                .unwrap_or(defaults.default_promotion),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_filter: "console_chess=info".to_string(),
            output: OutputFormat::Text,
            default_promotion: Promotion::Queen,
        }
    }
}
