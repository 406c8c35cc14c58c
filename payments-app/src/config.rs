//! Configuration loading from environment.

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use payment_providers::{ProviderSettings, SimulatedBehavior};
use rust_decimal::Decimal;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub provider_timeout: Duration,
    pub providers: ProviderSettings,
    pub webhook_url: Option<String>,
    pub reconcile_interval: Duration,
    pub pending_grace: Duration,
    pub rate_limit_per_minute: u32,
    pub trusted_proxies: Vec<IpAddr>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value when set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let providers = ProviderSettings {
            stripe: parse_or(&lookup, "STRIPE_BEHAVIOR", SimulatedBehavior::AlwaysApprove)?,
            paypal: parse_or(
                &lookup,
                "PAYPAL_BEHAVIOR",
                SimulatedBehavior::Random { approval_rate: 0.8 },
            )?,
            latency: Duration::from_millis(parse_or(&lookup, "PROVIDER_LATENCY_MS", 0)?),
            stripe_amount_limit: parse_or(&lookup, "STRIPE_AMOUNT_LIMIT", Decimal::from(10_000))?,
        };

        let config = Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url,
            provider_timeout: Duration::from_millis(parse_or(
                &lookup,
                "PROVIDER_TIMEOUT_MS",
                5_000,
            )?),
            providers,
            webhook_url: lookup("WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
            reconcile_interval: Duration::from_secs(parse_or(
                &lookup,
                "RECONCILE_INTERVAL_SECS",
                60,
            )?),
            pending_grace: Duration::from_secs(parse_or(&lookup, "PENDING_GRACE_SECS", 300)?),
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 100)?,
            trusted_proxies: parse_list(&lookup, "TRUSTED_PROXIES")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that parsing alone cannot catch.
    fn validate(&self) -> anyhow::Result<()> {
        if self.reconcile_interval.is_zero() {
            anyhow::bail!("Invalid value for RECONCILE_INTERVAL_SECS: must be greater than zero");
        }

        // A sweep must never expire a payment whose provider call may still answer.
        let longest_charge = self.provider_timeout + self.providers.latency;
        if self.pending_grace <= longest_charge {
            anyhow::bail!(
                "Invalid value for PENDING_GRACE_SECS: {}s must exceed PROVIDER_TIMEOUT_MS plus PROVIDER_LATENCY_MS ({} ms)",
                self.pending_grace.as_secs(),
                longest_charge.as_millis()
            );
        }

        Ok(())
    }
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
    }
}

fn parse_list<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Invalid value for {}: '{}'", key, item))
        })
        .collect()
}
