use chrono::{FixedOffset, Offset, Utc};

/// Application-level constants
pub const APP_NAME: &str = "Clinic Intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the clinic API base address.
pub const API_URL_ENV: &str = "CLINIC_API_URL";

/// Environment variable holding the clinic's UTC offset (`+05:30`, `UTC`).
pub const TZ_OFFSET_ENV: &str = "CLINIC_TZ_OFFSET";

/// Base address used when `CLINIC_API_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Log filter applied when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinic_intake_lib=info,clinic_intake=info,warn"
}

/// Resolve the API base address from the environment.
pub fn api_base_url() -> String {
    resolve_base_url(std::env::var(API_URL_ENV).ok())
}

fn resolve_base_url(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid time zone offset '{0}'. Use +HH:MM, -HH:MM or UTC")]
    InvalidOffset(String),
}

/// Time zone in which patients enter appointment date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClinicTimeZone {
    /// The host's local zone, DST rules included.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl ClinicTimeZone {
    /// UTC as a fixed zone.
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Read `CLINIC_TZ_OFFSET`; unset or blank means the host's local zone.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(TZ_OFFSET_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Ok(Self::Local),
        }
    }

    /// Parse `+HH:MM`, `-HH:MM`, `+HHMM`, `Z` or `UTC`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let invalid = || ConfigError::InvalidOffset(value.to_string());

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }
}
