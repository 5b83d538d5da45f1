use crate::utils::time::{parse_time_string, parse_timezone};
use anyhow::{Context, Result};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Sqlite {
        database_url: String,
    },
    GoogleSheets {
        service_account_file: PathBuf,
        spreadsheet_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub log_channel_id: Option<u64>,
    pub timezone: Tz,
    pub daily_reset_time: NaiveTime,
    pub snapshot_interval_secs: u64,
    pub ledger_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub require_mention: bool,
    pub notify_outside_window: bool,
    pub backend: Backend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = var("DISCORD_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let guild_id = parse_optional_id(var("GUILD_ID"), "GUILD_ID")?;
        let log_channel_id = parse_optional_id(var("LOG_CHANNEL_ID"), "LOG_CHANNEL_ID")?;

        let timezone = parse_timezone(&var("TIMEZONE").unwrap_or_else(|| "America/Sao_Paulo".to_string()))
            .context("TIMEZONE")?;

        let daily_reset_time = parse_time_string(&var("DAILY_RESET_TIME").unwrap_or_else(|| "00:25".to_string()))
            .context("DAILY_RESET_TIME")?;

        let snapshot_interval_secs = match var("SNAPSHOT_INTERVAL_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or_else(|| anyhow::anyhow!("SNAPSHOT_INTERVAL_SECS must be a positive integer"))?,
            None => 300,
        };

        let ledger_path = PathBuf::from(var("LEDGER_PATH").unwrap_or_else(|| "presence_cache.json".to_string()));
        let catalog_path = var("CATALOG_PATH").map(PathBuf::from);

        let require_mention = parse_flag(var("REQUIRE_MENTION"), true, "REQUIRE_MENTION")?;
        let notify_outside_window = parse_flag(var("NOTIFY_OUTSIDE_WINDOW"), false, "NOTIFY_OUTSIDE_WINDOW")?;

        let backend = match var("PRESENCE_BACKEND").as_deref().map(str::trim) {
            None | Some("sqlite") => Backend::Sqlite {
                database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:presence.db".to_string()),
            },
            Some("google-sheets") => Backend::GoogleSheets {
                service_account_file: var("GOOGLE_SERVICE_ACCOUNT_FILE").map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("GOOGLE_SERVICE_ACCOUNT_FILE is required for the google-sheets backend")
                })?,
                spreadsheet_id: var("GOOGLE_SPREADSHEET_ID").ok_or_else(|| {
                    anyhow::anyhow!("GOOGLE_SPREADSHEET_ID is required for the google-sheets backend")
                })?,
            },
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "PRESENCE_BACKEND must be 'sqlite' or 'google-sheets', got '{}'",
                    other
                ));
            }
        };

        Ok(Config {
            discord_token,
            guild_id,
            log_channel_id,
            timezone,
            daily_reset_time,
            snapshot_interval_secs,
            ledger_path,
            catalog_path,
            require_mention,
            notify_outside_window,
            backend,
        })
    }
}

fn parse_optional_id(value: Option<String>, name: &str) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("{} must be a numeric Discord id", name))
        })
        .transpose()
}

fn parse_flag(value: Option<String>, default: bool, name: &str) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow::anyhow!("{} must be true or false", name)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = config(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.daily_reset_time, NaiveTime::from_hms_opt(0, 25, 0).unwrap());
        assert_eq!(config.snapshot_interval_secs, 300);
        assert_eq!(config.ledger_path, PathBuf::from("presence_cache.json"));
        assert!(config.require_mention);
        assert!(!config.notify_outside_window);
        assert_eq!(
            config.backend,
            Backend::Sqlite { database_url: "sqlite:presence.db".to_string() }
        );
        assert!(config.log_channel_id.is_none());
    }

    #[test]
    fn token_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn invalid_values_fail() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("TIMEZONE", "Nowhere/City")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("DAILY_RESET_TIME", "noon")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("LOG_CHANNEL_ID", "#log")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("SNAPSHOT_INTERVAL_SECS", "0")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("REQUIRE_MENTION", "maybe")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("PRESENCE_BACKEND", "excel")]).is_err());
    }

    #[test]
    fn google_backend_needs_credentials() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("PRESENCE_BACKEND", "google-sheets")]).is_err());

        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("PRESENCE_BACKEND", "google-sheets"),
            ("GOOGLE_SERVICE_ACCOUNT_FILE", "credentials/bot.json"),
            ("GOOGLE_SPREADSHEET_ID", "sheet123"),
        ])
        .unwrap();
        assert_eq!(
            config.backend,
            Backend::GoogleSheets {
                service_account_file: PathBuf::from("credentials/bot.json"),
                spreadsheet_id: "sheet123".to_string(),
            }
        );
    }

    #[test]
    fn policy_flags_and_ids_parse() {
        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("REQUIRE_MENTION", "false"),
            ("NOTIFY_OUTSIDE_WINDOW", "YES"),
            ("LOG_CHANNEL_ID", "123456789012345678"),
            ("GUILD_ID", "42"),
        ])
        .unwrap();
        assert!(!config.require_mention);
        assert!(config.notify_outside_window);
        assert_eq!(config.log_channel_id, Some(123456789012345678));
        assert_eq!(config.guild_id, Some(42));
    }
}
