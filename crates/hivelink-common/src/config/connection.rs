use std::time::Duration;

use log::debug;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::config::loader::{deserialize_non_zero, deserialize_secret};
use crate::config::HIVE_SERVER2_PORT_DEFAULT;
use crate::error::{CommonError, CommonResult};

const URL_SCHEME: &str = "hive2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    /// SASL PLAIN handshake followed by length-framed Thrift messages.
    Sasl,
    /// Raw Thrift messages on the socket.
    NoSasl,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    pub transport: TransportMode,
    #[serde(deserialize_with = "deserialize_non_zero")]
    pub connect_timeout_secs: Option<u64>,
    #[serde(deserialize_with = "deserialize_non_zero")]
    pub socket_timeout_secs: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: HIVE_SERVER2_PORT_DEFAULT,
            database: "default".to_string(),
            user: "hive".to_string(),
            password: SecretString::new(String::new().into_boxed_str()),
            transport: TransportMode::Sasl,
            connect_timeout_secs: Some(30),
            socket_timeout_secs: None,
        }
    }
}

impl ConnectionConfig {
    /// Creates a connection configuration from a URL such as
    /// `jdbc:hive2://mobi3:10000/hivans;user=root`.
    pub fn from_url(url: &str) -> CommonResult<Self> {
        let mut config = Self::default();
        config.apply_url(url)?;
        Ok(config)
    }

    /// Overrides the fields present in the URL and keeps the others.
    ///
    /// The accepted form is
    /// `[jdbc:]hive2://host[:port][/database][;key=value...][?hive-conf][#hive-vars]`.
    /// The session variables `user`, `password`, and `auth` are understood,
    /// and other session variables are ignored. Hive configuration and
    /// variable lists are ignored as well.
    /// Error messages leave out the session variables.
    pub fn apply_url(&mut self, url: &str) -> CommonResult<()> {
        let url = url.trim();
        let url = url.strip_prefix("jdbc:").unwrap_or(url);
        let url = match url.find(['?', '#']) {
            Some(n) => {
                let (url, lists) = url.split_at(n);
                for key in lists
                    .split(['?', '#', ';'])
                    .filter_map(|s| s.split_once('=').map(|(k, _)| k.trim()))
                {
                    debug!("ignoring Hive setting `{key}` in connection URL");
                }
                url
            }
            None => url,
        };
        let (base, session) = match url.split_once(';') {
            Some((base, session)) => (base, session),
            None => (url, ""),
        };
        let parsed =
            Url::parse(base).map_err(|e| CommonError::invalid(format!("{base}: {e}")))?;
        if parsed.scheme() != URL_SCHEME {
            return Err(CommonError::invalid(format!(
                "expected the `{URL_SCHEME}` scheme in connection URL: {base}"
            )));
        }
        if let Some(host) = parsed.host_str().filter(|h| !h.is_empty()) {
            self.host = host.to_string();
        }
        if let Some(port) = parsed.port() {
            self.port = port;
        }
        let database = parsed.path().trim_matches('/');
        if !database.is_empty() {
            self.database = database.to_string();
        }
        for variable in session.split(';').filter(|s| !s.trim().is_empty()) {
            let (key, value) = variable.split_once('=').ok_or_else(|| {
                CommonError::invalid(format!(
                    "session variable without a value: {}",
                    variable.trim()
                ))
            })?;
            match key.trim() {
                "user" => self.user = value.to_string(),
                "password" => self.password = SecretString::new(value.to_string().into_boxed_str()),
                "auth" => self.transport = parse_auth(value)?,
                other => debug!("ignoring session variable `{other}` in connection URL"),
            }
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn socket_timeout(&self) -> Option<Duration> {
        self.socket_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_auth(value: &str) -> CommonResult<TransportMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "nosasl" => Ok(TransportMode::NoSasl),
        "none" | "plain" => Ok(TransportMode::Sasl),
        other => Err(CommonError::unsupported(format!("authentication mode: {other}"))),
    }
}
