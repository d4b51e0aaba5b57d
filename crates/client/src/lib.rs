//! # Ward Client
//!
//! HTTP implementation of [`ward_core::BedApi`] over the ward API's JSON endpoints.
//!
//! Every failure mode the board cares about is mapped onto a [`BoardError`]:
//! - connection problems and timeouts become `Transport`
//! - any non-2xx response becomes `Status`
//! - a body that does not parse becomes `Decode`

#![warn(rust_2018_idioms)]

use api_shared::{routes, wire};
use serde::de::DeserializeOwned;
use serde::Serialize;
use ward_core::{BedApi, BoardConfig, BoardError, BoardResult};

#[derive(Clone, Debug)]
pub struct HttpBedApi {
    client: reqwest::Client,
    cfg: BoardConfig,
}

impl HttpBedApi {
    /// Build a client for the configured ward API.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Config` if the underlying HTTP client cannot be constructed.
    pub fn new(cfg: BoardConfig) -> BoardResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BoardError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.cfg
    }

    /// Check that the ward API is reachable.
    pub async fn health(&self) -> BoardResult<wire::HealthRes> {
        self.get_json(routes::HEALTH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BoardResult<T> {
        let url = self.cfg.endpoint(path);
        tracing::debug!("GET {url}");
        let res = self.client.get(&url).send().await.map_err(transport)?;
        read_json(res).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> BoardResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.cfg.endpoint(path);
        tracing::debug!("PUT {url}");
        let res = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        read_json(res).await
    }
}

fn transport(e: reqwest::Error) -> BoardError {
    if e.is_timeout() {
        BoardError::Transport(format!("request timed out: {e}"))
    } else {
        BoardError::Transport(e.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> BoardResult<T> {
    let status = res.status();
    if !status.is_success() {
        return Err(BoardError::Status {
            status: status.as_u16(),
        });
    }
    let body = res.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| BoardError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl BedApi for HttpBedApi {
    async fn fetch_wards(&self) -> BoardResult<Vec<wire::Ward>> {
        self.get_json(routes::WARDS).await
    }

    async fn fetch_patients(&self) -> BoardResult<Vec<wire::Patient>> {
        self.get_json(routes::PATIENTS).await
    }

    async fn assign_bed(&self, req: wire::AssignBedReq) -> BoardResult<wire::MutationRes> {
        self.put_json(routes::ASSIGN_BED, &req).await
    }

    async fn unassign_bed(&self, req: wire::UnassignBedReq) -> BoardResult<wire::MutationRes> {
        self.put_json(routes::UNASSIGN_BED, &req).await
    }

    async fn change_bed_status(&self, req: wire::BedStatusReq) -> BoardResult<wire::MutationRes> {
        self.put_json(routes::BED_STATUS, &req).await
    }
}
