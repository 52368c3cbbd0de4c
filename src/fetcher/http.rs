//! reqwest-backed fetcher

use super::{FetchError, Fetcher, TimedResponse};
use crate::config::RunConfig;
use crate::errors::{ErrorContext, Result};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use tracing::debug;

/// Fetcher issuing real GET requests through a shared connection pool
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build the client from the run configuration.
    ///
    /// Proxies come only from `config.proxy`; environment proxy variables are
    /// ignored when none is configured.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(Self::header_map(config)?)
            .danger_accept_invalid_certs(config.insecure);

        match &config.proxy {
            Some(proxy) => {
                if let Some(http) = &proxy.http {
                    builder = builder.proxy(reqwest::Proxy::http(http)?);
                }
                if let Some(https) = &proxy.https {
                    builder = builder.proxy(reqwest::Proxy::https(https)?);
                }
            }
            None => builder = builder.no_proxy(),
        }

        Ok(Self {
            client: builder.build()?,
            timeout: config.timeout,
        })
    }

    fn header_map(config: &RunConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in config.custom_headers()? {
            let name = HeaderName::from_bytes(key.as_bytes())
                .with_config_context(&format!("Invalid header name '{}'", key))?;
            let value = HeaderValue::from_str(&value)
                .with_config_context(&format!("Invalid value for header '{}'", key))?;
            headers.append(name, value);
        }
        Ok(headers)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<TimedResponse, FetchError> {
        let send_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status();

        // The timing covers the whole body, not just the headers
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let elapsed = send_time.elapsed();

        debug!(
            "GET {} -> {} ({} bytes in {:?})",
            url,
            status,
            body.len(),
            elapsed
        );
        Ok(TimedResponse::new(status.as_u16(), elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(urls: Vec<String>) -> RunConfig {
        RunConfig::with_urls(urls)
    }

    #[tokio::test]
    async fn test_fetch_reports_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sample-text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let url = format!("{}/sample-text", server.uri());
        let fetcher = HttpFetcher::new(&config_for(vec![url.clone()])).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_a_response_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        let fetcher = HttpFetcher::new(&config_for(vec![url.clone()])).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_fetch_sends_custom_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-bench", "1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/", server.uri());
        let mut config = config_for(vec![url.clone()]);
        config.headers = vec!["X-Bench: 1".to_string()];
        let fetcher = HttpFetcher::new(&config).unwrap();

        assert!(fetcher.fetch(&url).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_fetch_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let url = format!("{}/slow", server.uri());
        let mut config = config_for(vec![url.clone()]);
        config.timeout = Duration::from_millis(200);
        let fetcher = HttpFetcher::new(&config).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(Duration::from_millis(200)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_failure() {
        // Port 1 is reserved and never listening on test hosts
        let url = "http://127.0.0.1:1/".to_string();
        let fetcher = HttpFetcher::new(&config_for(vec![url.clone()])).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_goes_through_configured_proxy() {
        // The origin host is not resolvable here, so a 200 can only come from the proxy
        let proxy = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&proxy)
            .await;

        let url = "http://www.scion-sample.org/hello-world".to_string();
        let mut config = config_for(vec![url.clone()]);
        config.proxy = Some(ProxyConfig {
            http: Some(proxy.uri()),
            https: None,
        });
        let fetcher = HttpFetcher::new(&config).unwrap();

        assert!(fetcher.fetch(&url).await.unwrap().is_success());
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let mut config = config_for(vec!["http://localhost/".to_string()]);
        config.headers = vec!["Bad Name: x".to_string()];
        assert!(HttpFetcher::new(&config).is_err());
    }
}
