#[derive(serde::Deserialize, Debug, Clone)]
pub struct HttpConfig {
    pub proxy_http: Option<Box<str>>,
    pub proxy_https: Option<Box<str>>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            proxy_http: None,
            proxy_https: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
