//! Service configuration, read from the environment

use anyhow::{Context, Result};
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Attempts per cart mutation before giving up on a version conflict.
    pub cart_cas_retries: u32,
    pub default_currency: String,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            bind_addr: parsed(&lookup, "BIND_ADDR", "0.0.0.0")?,
            port: parsed(&lookup, "PORT", "8083")?,
            cart_cas_retries: parsed::<u32>(&lookup, "CART_CAS_RETRIES", "3")?.max(1),
            default_currency: lookup("DEFAULT_CURRENCY").filter(|c| !c.trim().is_empty()).unwrap_or_else(|| "CNY".to_string()),
        })
    }

    pub fn listen_addr(&self) -> String { format!("{}:{}", self.bind_addr, self.port) }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().with_context(|| format!("{key} has an invalid value: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.cart_cas_retries, 3);
        assert_eq!(c.default_currency, "CNY");
        assert_eq!(c.listen_addr(), "0.0.0.0:8083");
    }

    #[test]
    fn test_overrides_and_errors() {
        let c = config(&[("PORT", "9000"), ("CART_CAS_RETRIES", "0"), ("DEFAULT_CURRENCY", "USD")]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.cart_cas_retries, 1);
        assert_eq!(c.default_currency, "USD");
        assert!(config(&[("PORT", "eighty")]).is_err());
    }
}
