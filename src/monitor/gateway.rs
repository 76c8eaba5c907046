/// Admin gateway client
use crate::{
    api::models::{BanRequest, StatusSnapshot, UnbanRequest},
    error::{ModError, ModResult},
};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::debug;

/// Calls the monitoring client makes against the admin gateway
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// `GET /admin?key=`
    async fn fetch_status(&self, key: &str) -> ModResult<StatusSnapshot>;

    /// `POST /admin/ban?key=`
    async fn ban(&self, key: &str, ip: &str, reason: Option<&str>) -> ModResult<()>;

    /// `POST /admin/unban?key=`
    async fn unban(&self, key: &str, ip: &str) -> ModResult<()>;
}

/// HTTP implementation of [`GatewayApi`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    client: Client,
}

impl HttpGateway {
    /// Create a client for the gateway at `base_url`
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ModResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ModError::Validation(format!("Invalid backend URL {}: {}", base_url, e)))?;

        // Url::join replaces the last path segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    fn endpoint(&self, path: &str, key: &str) -> ModResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ModError::Internal(format!("Invalid endpoint {}: {}", path, e)))?;
        url.query_pairs_mut().clear().append_pair("key", key);
        Ok(url)
    }

    fn check(response: Response) -> ModResult<Response> {
        let status = response.status();
        if !status.is_success() {
            debug!("Gateway answered {}", status);
            return Err(ModError::GatewayRejected(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl GatewayApi for HttpGateway {
    async fn fetch_status(&self, key: &str) -> ModResult<StatusSnapshot> {
        let response = self
            .client
            .get(self.endpoint("admin", key)?)
            .send()
            .await?;

        Self::check(response)?
            .json::<StatusSnapshot>()
            .await
            .map_err(|e| ModError::Decode(e.to_string()))
    }

    async fn ban(&self, key: &str, ip: &str, reason: Option<&str>) -> ModResult<()> {
        let body = BanRequest {
            ip: ip.to_string(),
            reason: reason.map(str::to_string),
        };

        let response = self
            .client
            .post(self.endpoint("admin/ban", key)?)
            .json(&body)
            .send()
            .await?;

        Self::check(response)?;
        Ok(())
    }

    async fn unban(&self, key: &str, ip: &str) -> ModResult<()> {
        let body = UnbanRequest { ip: ip.to_string() };

        let response = self
            .client
            .post(self.endpoint("admin/unban", key)?)
            .json(&body)
            .send()
            .await?;

        Self::check(response)?;
        Ok(())
    }
}
