//! `GetWebPage` and the page fetcher behind it

use super::{IntrinsicRegistry, str_arg};
use crate::config::EvalConfig;
use crate::error::Result;
use crate::value::Value;
use std::sync::Arc;
use std::time::Duration;

/// Source of web page bodies for `GetWebPage`.
///
/// The error string is only logged; the builtin substitutes its fallback argument.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> std::result::Result<String, String>;
}

/// Blocking HTTP GET through reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::from_config(&EvalConfig::default())
    }
}

impl HttpFetcher {
    pub fn from_config(config: &EvalConfig) -> Self {
        HttpFetcher {
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<String, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| e.to_string())?;
        client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| e.to_string())
    }
}

pub(super) fn register(reg: &mut IntrinsicRegistry, fetcher: Arc<dyn PageFetcher>) -> Result<()> {
    reg.register("GetWebPage", "S,S", move |args| {
        let (url, fallback) = (str_arg(args, 0)?, str_arg(args, 1)?);
        match fetcher.fetch(url) {
            Ok(body) => Ok(Value::from(body)),
            Err(reason) => {
                tracing::warn!(url, %reason, "web fetch failed, using fallback");
                Ok(Value::from(fallback))
            }
        }
    })
}
