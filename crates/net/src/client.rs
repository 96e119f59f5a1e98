//! `ajax`, `get` and `post`
//!
//! Request building is shared: URLs are resolved against the configured
//! base, `GET` data goes to the query string, other methods carry it as
//! the body (JSON when the content type says so, form-encoded otherwise).
//! Every request carries `X-Requested-With`.

use serde_json::{Map, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{NetError, Result};
use crate::request::{append_query, encode_form, RequestDescriptor, ResponseBody, ResponseType};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Network helper client over a [`Transport`]
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl Client<HttpTransport> {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a configurable request
    ///
    /// Failures never propagate: they go to `on_error`, or to the log when
    /// there is no error callback, and the result is `None`.
    pub async fn ajax(&self, request: RequestDescriptor) -> Option<ResponseBody> {
        let RequestDescriptor {
            url,
            method,
            data,
            headers,
            response_type,
            on_success,
            on_error,
        } = request;

        match self.execute(url, method, data, headers, response_type).await {
            Ok(body) => {
                if let Some(callback) = on_success {
                    callback(&body);
                }
                Some(body)
            }
            Err(e) => {
                match on_error {
                    Some(callback) => callback(&e),
                    None => tracing::error!("ajax request failed: {}", e),
                }
                None
            }
        }
    }

    /// `GET` with `params` in the query string, decoding a JSON body
    pub async fn get(&self, url: &str, params: &Map<String, Value>) -> Result<Value> {
        let url = append_query(self.resolve(url)?.as_str(), &encode_form(params)?);
        let request = HttpRequest {
            method: "GET".to_string(),
            url,
            headers: vec![self.requested_with()],
            body: None,
        };
        let response = self.send_checked(request).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Form-encoded `POST`, decoding a JSON body
    pub async fn post(&self, url: &str, data: &Map<String, Value>) -> Result<Value> {
        let request = HttpRequest {
            method: "POST".to_string(),
            url: self.resolve(url)?.to_string(),
            headers: vec![
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
                self.requested_with(),
            ],
            body: Some(encode_form(data)?),
        };
        let response = self.send_checked(request).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn execute(
        &self,
        url: String,
        method: String,
        data: Option<Map<String, Value>>,
        headers: Vec<(String, String)>,
        response_type: ResponseType,
    ) -> Result<ResponseBody> {
        let content_type = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| self.config.default_content_type.clone());

        let mut url = self.resolve(&url)?.to_string();
        let mut body = None;
        if let Some(data) = data {
            if method == "GET" {
                url = append_query(&url, &encode_form(&data)?);
            } else if is_json(&content_type) {
                body = Some(Value::Object(data).to_string());
            } else {
                body = Some(encode_form(&data)?);
            }
        }

        let mut merged = vec![
            ("Content-Type".to_string(), content_type),
            self.requested_with(),
        ];
        for (name, value) in headers {
            merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            merged.push((name, value));
        }

        let request = HttpRequest {
            method,
            url,
            headers: merged,
            body,
        };
        let response = self.send_checked(request).await?;
        ResponseBody::decode(response.body, response_type)
    }

    async fn send_checked(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!("Sending {} {}", request.method, request.url);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(NetError::Status {
                status: response.status,
            });
        }
        Ok(response)
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        let invalid = |source| NetError::InvalidUrl {
            url: url.to_string(),
            source,
        };
        match (Url::parse(url), &self.config.base_url) {
            (Ok(absolute), _) => Ok(absolute),
            (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => Url::parse(base)
                .and_then(|base| base.join(url))
                .map_err(invalid),
            (Err(e), _) => Err(invalid(e)),
        }
    }

    fn requested_with(&self) -> (String, String) {
        (
            "X-Requested-With".to_string(),
            self.config.requested_with.clone(),
        )
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("application/json")
}
