//! HTTP implementation of the dataset gateway.

use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{DatasetGateway, GatewayError, GatewayResult};
use crate::config::ClientConfig;
use crate::models::{Dataset, Row, ServiceHealth};

/// Error envelope the service produces for failed requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Gateway speaking the service's HTTP surface.
pub struct HttpDatasetGateway {
    base_url: Url,
    client: Client,
}

impl HttpDatasetGateway {
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(transport)?;
        let base_url = Url::parse(&config.service_url).map_err(|e| {
            GatewayError::Transport(format!(
                "invalid service url '{}': {}",
                config.service_url, e
            ))
        })?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid endpoint '{}': {}", path, e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> GatewayResult<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(transport)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl DatasetGateway for HttpDatasetGateway {
    async fn list_datasets(&self) -> GatewayResult<Vec<Dataset>> {
        self.get_json(self.endpoint("datasets")?).await
    }

    async fn get_dataset(&self, id: &str) -> GatewayResult<Dataset> {
        self.get_json(self.endpoint(&format!("dataset/{}", id))?).await
    }

    async fn create_dataset(&self, dataset: &Dataset) -> GatewayResult<Dataset> {
        let url = self.endpoint("dataset")?;
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(dataset)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    async fn delete_dataset(&self, id: &str) -> GatewayResult<()> {
        let url = self.endpoint(&format!("dataset/{}", id))?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await.map_err(transport)?;
        check_status(response).await.map(|_| ())
    }

    async fn sample(&self, id: &str) -> GatewayResult<Vec<Row>> {
        self.get_json(self.endpoint(&format!("dataset/{}/sample", id))?)
            .await
    }

    async fn content(
        &self,
        id: &str,
        select: &str,
        where_clause: &str,
        order_by: &str,
        subscribe: bool,
    ) -> GatewayResult<Vec<Row>> {
        let mut url = self.endpoint(&format!("dataset/{}/content", id))?;
        url.query_pairs_mut()
            .append_pair("select", select)
            .append_pair("where", where_clause)
            .append_pair("orderBy", order_by)
            .append_pair("subscribe", if subscribe { "true" } else { "false" });
        self.get_json(url).await
    }

    async fn end_subscription(&self, id: &str) -> GatewayResult<()> {
        let url = self.endpoint(&format!("dataset/{}/content", id))?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await.map_err(transport)?;
        check_status(response).await.map(|_| ())
    }

    async fn health(&self) -> GatewayResult<ServiceHealth> {
        self.get_json(self.endpoint("health")?).await
    }
}

fn transport(error: reqwest::Error) -> GatewayError {
    GatewayError::Transport(error.to_string())
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

async fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

/// Map a failed response to an error, preferring the service's error
/// envelope and degrading to the raw body when the envelope does not parse.
fn api_error(status: StatusCode, body: &str) -> GatewayError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(envelope) => GatewayError::Api {
            status: envelope.status_code.unwrap_or_else(|| status.as_u16()),
            message: envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status_fallback(status)),
        },
        Err(_) => GatewayError::Api {
            status: status.as_u16(),
            message: if body.trim().is_empty() {
                status_fallback(status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

fn status_fallback(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gateway(base: &str) -> HttpDatasetGateway {
        HttpDatasetGateway::new(&ClientConfig {
            service_url: base.to_string(),
            stream_url: "ws://localhost:8080/eventbus".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn endpoints_join_below_a_prefixed_base_url() {
        let gateway = gateway("http://localhost:8080/api/");
        assert_eq!(
            gateway.endpoint("datasets").unwrap().as_str(),
            "http://localhost:8080/api/datasets"
        );
        assert_eq!(
            gateway.endpoint("dataset/d1/sample").unwrap().as_str(),
            "http://localhost:8080/api/dataset/d1/sample"
        );
    }

    #[test]
    fn api_error_prefers_the_service_envelope() {
        let error = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"statusCode": 400, "message": "unparseable where clause", "path": "/dataset/d1/content"}"#,
        );
        assert_eq!(
            error,
            GatewayError::Api {
                status: 400,
                message: "unparseable where clause".to_string()
            }
        );
    }

    #[test]
    fn api_error_degrades_to_the_raw_body() {
        let error = api_error(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(
            error,
            GatewayError::Api {
                status: 502,
                message: "upstream exploded".to_string()
            }
        );
    }

    #[test]
    fn api_error_falls_back_to_the_status_reason() {
        let error = api_error(StatusCode::NOT_FOUND, "");
        assert_eq!(
            error,
            GatewayError::Api {
                status: 404,
                message: "Not Found".to_string()
            }
        );
    }
}
