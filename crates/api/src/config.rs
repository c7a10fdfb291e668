use anyhow::Context;
use std::time::Duration;

const PREFIX: &str = "TIMETABLE__";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
    /// Default generation budget per job; `None` when disabled.
    pub time_budget: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            body_limit_bytes: 8 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            time_budget: Some(Duration::from_secs(300)),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |name: &str| -> anyhow::Result<Option<u64>> {
            let key = format!("{PREFIX}{name}");
            get(&key)
                .map(|v| v.trim().parse::<u64>().with_context(|| format!("{key}={v:?} is not a number")))
                .transpose()
        };

        let mut cfg = Self::default();
        if let Some(port) = read("SERVER__PORT")? {
            cfg.port = u16::try_from(port).context("port out of range")?;
        }
        if let Some(bytes) = read("SERVER__BODY_LIMIT_BYTES")? {
            cfg.body_limit_bytes = bytes as usize;
        }
        if let Some(secs) = read("SERVER__REQUEST_TIMEOUT_SEC")? {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read("JOBS__TIME_BUDGET_SEC")? {
            cfg.time_budget = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(cfg)
    }
}
