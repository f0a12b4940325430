use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::tracker::Policy;

const DEFAULT_FUNDING_URL: &str =
    "https://es.coinalyze.net/?order_by=fr_avg&order_dir=asc&columns=aQ";
const DEFAULT_PCHANGE_URL: &str =
    "https://es.coinalyze.net/?order_by=price_24hour_pchange&order_dir=desc&columns=Yg";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub poll_interval: Duration,
    pub http: HttpConfig,
    pub smtp: Option<SmtpConfig>,
    pub telegram: Option<TelegramConfig>,
    pub log: LogConfig,
    pub policy: Policy,
}

/// Where and how the two listings are fetched.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub funding_url: String,
    pub pchange_url: String,
    pub site_origin: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub file: String,
    pub level: String,
    pub backups: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let poll_secs: u64 = parse_or(get("POLL_INTERVAL_SECS"), "POLL_INTERVAL_SECS", 120)?;
        if poll_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be at least 1");
        }
        let poll_interval = Duration::from_secs(poll_secs);
        let timeout = Duration::from_secs(parse_or(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", 10)?);

        let http = HttpConfig {
            funding_url: or("FUNDING_URL", DEFAULT_FUNDING_URL),
            pchange_url: or("PCHANGE_URL", DEFAULT_PCHANGE_URL),
            site_origin: or("SITE_ORIGIN", "https://es.coinalyze.net")
                .trim_end_matches('/')
                .to_string(),
            user_agent: or("HTTP_USER_AGENT", DEFAULT_USER_AGENT),
            referer: or("HTTP_REFERER", "https://es.coinalyze.net/"),
            timeout,
        };

        let smtp_port = parse_or(get("SMTP_PORT"), "SMTP_PORT", 587)?;
        let recipients: Vec<String> = get("EMAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // email is only usable with credentials and at least one recipient
        let smtp = match (get("SMTP_USERNAME"), get("EMAIL_PASSWORD")) {
            (Some(username), Some(password)) if !recipients.is_empty() => Some(SmtpConfig {
                host: or("SMTP_HOST", "smtp.gmail.com"),
                port: smtp_port,
                from: get("EMAIL_FROM").unwrap_or_else(|| username.clone()),
                username,
                password,
                to: recipients,
                timeout,
            }),
            _ => None,
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                api_base: or("TELEGRAM_API_BASE", "https://api.telegram.org")
                    .trim_end_matches('/')
                    .to_string(),
                bot_token,
                chat_id,
                timeout,
            }),
            _ => None,
        };

        let log = LogConfig {
            dir: PathBuf::from(or("LOG_DIR", ".")),
            file: or("LOG_FILE", "aggregator.log"),
            level: or("LOG_LEVEL", "info").to_lowercase(),
            backups: parse_or(get("LOG_BACKUPS"), "LOG_BACKUPS", 1)?,
        };

        let policy = match get("NOTIFIED_SET_POLICY").as_deref() {
            None => Policy::Replace,
            Some(raw) => match raw.to_lowercase().as_str() {
                "replace" => Policy::Replace,
                "accumulate" => Policy::Accumulate,
                other => bail!("NOTIFIED_SET_POLICY must be `replace` or `accumulate`, got `{other}`"),
            },
        };

        Ok(Self {
            poll_interval,
            http,
            smtp,
            telegram,
            log,
            policy,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got `{v}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();

        assert_eq!(cfg.poll_interval, Duration::from_secs(120));
        assert_eq!(cfg.http.timeout, Duration::from_secs(10));
        assert_eq!(cfg.http.site_origin, "https://es.coinalyze.net");
        assert_eq!(cfg.http.referer, "https://es.coinalyze.net/");
        assert_eq!(cfg.log.file, "aggregator.log");
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.backups, 1);
        assert_eq!(cfg.policy, Policy::Replace);
        assert!(cfg.smtp.is_none());
        assert!(cfg.telegram.is_none());
    }

    #[test]
    fn recipients_are_split_and_trimmed() {
        let cfg = config(&[
            ("SMTP_USERNAME", "bot@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("EMAIL_TO", " a@example.com, ,b@example.com "),
        ])
        .unwrap();

        let smtp = cfg.smtp.unwrap();
        assert_eq!(smtp.to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(smtp.from, "bot@example.com");
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 587);
    }

    #[test]
    fn email_disabled_without_recipients() {
        let cfg = config(&[("SMTP_USERNAME", "bot@example.com"), ("EMAIL_PASSWORD", "secret")]).unwrap();
        assert!(cfg.smtp.is_none());
    }

    #[test]
    fn telegram_needs_token_and_chat() {
        let cfg = config(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert!(cfg.telegram.is_none());

        let cfg = config(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100"),
            ("TELEGRAM_API_BASE", "http://localhost:8081/"),
        ])
        .unwrap();
        let tg = cfg.telegram.unwrap();
        assert_eq!(tg.api_base, "http://localhost:8081");
        assert_eq!(tg.chat_id, "-100");
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = config(&[("POLL_INTERVAL_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_SECS"));

        let cfg = config(&[("POLL_INTERVAL_SECS", "1")]).unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config(&[("POLL_INTERVAL_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_SECS"));
    }

    #[test]
    fn policy_is_parsed() {
        let cfg = config(&[("NOTIFIED_SET_POLICY", "Accumulate")]).unwrap();
        assert_eq!(cfg.policy, Policy::Accumulate);
        assert!(config(&[("NOTIFIED_SET_POLICY", "forever")]).is_err());
    }
}
