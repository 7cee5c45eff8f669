//! HTTP-backed repository.
//!
//! Talks JSON to a REST-style service laid out as:
//!
//! | operation    | request                    | missing record |
//! |--------------|----------------------------|----------------|
//! | `list`       | `GET    {base}/{coll}`     |                |
//! | `find_by_id` | `GET    {base}/{coll}/{id}`| 404            |
//! | `insert`     | `POST   {base}/{coll}`     |                |
//! | `update`     | `PUT    {base}/{coll}/{id}`| 404            |
//! | `delete`     | `DELETE {base}/{coll}/{id}`| 404            |
//!
//! The server assigns ids on insert and returns the stored record. Any other
//! non-success status, a transport error or a timeout becomes
//! `StoreError::Unavailable`.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use super::{Entity, Repository};
use crate::types::errors::{StoreError, StoreResult};

pub struct RemoteRepository<T> {
    client: Client,
    base: Url,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RemoteRepository<T> {
    /// Creates a client for `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| StoreError::validation(format!("invalid remote base url '{}': {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            _entity: PhantomData,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn collection_url(&self) -> StoreResult<Url> {
        self.base
            .join(T::COLLECTION)
            .map_err(|e| StoreError::Unavailable(format!("bad collection url: {}", e)))
    }

    fn record_url(&self, id: i64) -> StoreResult<Url> {
        self.base
            .join(&format!("{}/{}", T::COLLECTION, id))
            .map_err(|e| StoreError::Unavailable(format!("bad record url: {}", e)))
    }

    /// Maps a non-success status to `Unavailable`.
    fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::Unavailable(format!(
                "{} {} returned {}",
                T::NAME,
                response.url(),
                status
            )))
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for RemoteRepository<T> {
    async fn list(&self) -> StoreResult<Vec<T>> {
        let response = self.client.get(self.collection_url()?).send().await?;
        let mut records: Vec<T> = Self::check(response)?.json().await?;
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<T>> {
        let response = self.client.get(self.record_url(id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response)?.json().await?))
    }

    async fn insert(&self, entity: T) -> StoreResult<T> {
        let response = self
            .client
            .post(self.collection_url()?)
            .json(&entity)
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn update(&self, entity: &T) -> StoreResult<bool> {
        let response = self
            .client
            .put(self.record_url(entity.id())?)
            .json(entity)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response)?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let response = self.client.delete(self.record_url(id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response)?;
        Ok(true)
    }
}
