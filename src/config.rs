use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
#[cfg(test)]
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Fixed business offset used when BUSINESS_UTC_OFFSET is unset (no daylight saving)
pub const DEFAULT_BUSINESS_UTC_OFFSET: &str = "-05:00";

/// Widest offset in use anywhere (UTC+14:00, Line Islands)
pub const MAX_UTC_OFFSET_SECS: i32 = 14 * 3600;

#[derive(Debug, Clone)]
pub struct Config {
    // Holiday source (JSON array of ISO-8601 date-time strings)
    pub holidays_url: String,
    pub holidays_timeout_secs: u64,

    // HTTP listen port
    pub port: u16,

    // Business zone as a fixed offset from UTC
    pub business_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let offset = get("BUSINESS_UTC_OFFSET")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BUSINESS_UTC_OFFSET.to_string());

        Ok(Config {
            holidays_url: get("HOLIDAYS_URL")
                .filter(|s| !s.trim().is_empty())
                .context("HOLIDAYS_URL not set")?,
            holidays_timeout_secs: get("HOLIDAYS_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            port: get("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,

            business_offset: parse_utc_offset(&offset)
                .with_context(|| format!("BUSINESS_UTC_OFFSET '{}' must look like -05:00", offset))?,
        })
    }

    /// Create config from a HashMap (convenience for testing)
    #[cfg(test)]
    pub fn from_map(map: &HashMap<&str, &str>) -> Result<Self> {
        Self::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    pub fn holidays_timeout(&self) -> Duration {
        Duration::from_secs(self.holidays_timeout_secs)
    }

    /// Validate configuration values at startup.
    /// Returns Ok(()) if all validations pass, or Err with details of what failed.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if !(self.holidays_url.starts_with("http://") || self.holidays_url.starts_with("https://"))
        {
            errors.push(format!(
                "HOLIDAYS_URL '{}' must be an http:// or https:// URL.",
                self.holidays_url
            ));
        }

        if self.holidays_timeout_secs == 0 {
            errors.push("HOLIDAYS_TIMEOUT_SECS must be greater than 0.".to_string());
        } else if self.holidays_timeout_secs > 120 {
            errors.push(format!(
                "HOLIDAYS_TIMEOUT_SECS={} seems too long (max recommended: 120).",
                self.holidays_timeout_secs
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }
}

/// Parse `±HH:MM` (or `Z`) into a fixed offset
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).context("zero offset");
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => bail!("offset must start with '+' or '-'"),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .context("offset must be formatted as ±HH:MM")?;
    if hours.len() != 2 || minutes.len() != 2 {
        bail!("offset must be formatted as ±HH:MM");
    }
    let hours: i32 = hours.parse().context("offset hours must be numeric")?;
    let minutes: i32 = minutes.parse().context("offset minutes must be numeric")?;
    if minutes >= 60 {
        bail!("offset minutes must be below 60");
    }

    let seconds = sign * (hours * 3600 + minutes * 60);
    if seconds.abs() > MAX_UTC_OFFSET_SECS {
        bail!("offset must be within -14:00..+14:00");
    }

    FixedOffset::east_opt(seconds).context("offset out of range")
}
