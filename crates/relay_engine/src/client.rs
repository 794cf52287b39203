use std::time::Duration;

use relay_logging::relay_debug;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{ClientError, FailureKind, PollReply, SubmitReply};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub submit_url: Url,
    /// Base for poll requests; the job id is appended as the last path segment.
    pub result_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn new(submit_url: &str, result_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            submit_url: parse_url(submit_url)?,
            result_url: parse_url(result_url)?,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn poll_url(&self, job_id: &str) -> Result<Url, ClientError> {
        let mut url = self.result_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::new(FailureKind::InvalidUrl, "result url cannot be a base")
            })?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw)
        .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {other}"),
        )),
    }
}

/// The remote job processor: one submission call, then one poll call per tick.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn submit(&self, input: &str) -> Result<SubmitReply, ClientError>;

    async fn poll(&self, job_id: &str) -> Result<PollReply, ClientError>;
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    idea: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit(&self, input: &str) -> Result<SubmitReply, ClientError> {
        let body = serde_json::to_vec(&SubmitBody { idea: input })
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        relay_debug!("POST {} ({} bytes)", self.settings.submit_url, body.len());

        let response = self
            .client
            .post(self.settings.submit_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let value = Self::read_json(response).await?;
        Ok(SubmitReply::from_json(&value))
    }

    async fn poll(&self, job_id: &str) -> Result<PollReply, ClientError> {
        let url = self.settings.poll_url(job_id)?;
        relay_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let value = Self::read_json(response).await?;
        Ok(PollReply::from_json(value))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_url_appends_job_id_segment() {
        for base in ["https://relay.example/result/", "https://relay.example/result"] {
            let settings = ClientSettings::new("https://relay.example/submit", base).unwrap();
            assert_eq!(
                settings.poll_url("job 1").unwrap().as_str(),
                "https://relay.example/result/job%201"
            );
        }
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let err =
            ClientSettings::new("ftp://relay.example/", "https://relay.example/").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);

        let err = ClientSettings::new("not a url", "https://relay.example/").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
