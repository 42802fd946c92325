//! The fetch seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::api_types::{ApiPage, ApiPokemon, ApiSpecies, ApiSummary};
use super::types::{DetailRecord, EntryId, SpeciesInfo, SummaryRecord};
use crate::config::ApiConfig;

/// Errors from the fetch layer.
///
/// HTTP failures and network failures are treated alike by callers; the
/// variants exist for logging and diagnostics, not for retry decisions.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("{url} returned status {status}")]
  Status { status: u16, url: String },

  #[error("malformed response from {url}: {reason}")]
  Malformed { url: String, reason: String },

  #[error("invalid url: {0}")]
  InvalidUrl(String),
}

/// Read access to the remote catalog.
///
/// The store depends on this seam instead of a concrete transport so tests
/// can substitute a scripted source.
#[async_trait]
pub trait CatalogSource: Send + Sync {
  /// Fetch the summary page: the first `limit` records in upstream order.
  async fn fetch_page(&self, limit: u32) -> Result<Vec<SummaryRecord>, FetchError>;

  /// Fetch a full detail record through its summary locator.
  async fn fetch_detail(&self, url: &str) -> Result<DetailRecord, FetchError>;

  /// Fetch a full detail record by id.
  async fn fetch_detail_by_id(&self, id: EntryId) -> Result<DetailRecord, FetchError>;

  /// Fetch the species sub-resource for an id.
  async fn fetch_species(&self, id: EntryId) -> Result<SpeciesInfo, FetchError>;
}

/// PokeAPI client over reqwest.
#[derive(Clone)]
pub struct PokeClient {
  http: reqwest::Client,
  base_url: Url,
}

impl PokeClient {
  pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
    // Url::join replaces the last path segment unless the base ends in '/'.
    let base = if config.base_url.ends_with('/') {
      config.base_url.clone()
    } else {
      format!("{}/", config.base_url)
    };
    let base_url =
      Url::parse(&base).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base, e)))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    Ok(Self { http, base_url })
  }

  fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
    self
      .base_url
      .join(path)
      .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
    debug!(url = %url, "fetching");

    let resp = self.http.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        status: status.as_u16(),
        url: url.to_string(),
      });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
      url: url.to_string(),
      reason: e.to_string(),
    })
  }
}

#[async_trait]
impl CatalogSource for PokeClient {
  async fn fetch_page(&self, limit: u32) -> Result<Vec<SummaryRecord>, FetchError> {
    let mut url = self.endpoint("pokemon")?;
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string());

    let page: ApiPage = self.get_json(url).await?;
    debug!(requested = limit, available = page.count, "summary page fetched");

    Ok(
      page
        .results
        .into_iter()
        .map(ApiSummary::into_summary)
        .collect(),
    )
  }

  async fn fetch_detail(&self, url: &str) -> Result<DetailRecord, FetchError> {
    let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    let pokemon: ApiPokemon = self.get_json(url).await?;
    Ok(pokemon.into_detail())
  }

  async fn fetch_detail_by_id(&self, id: EntryId) -> Result<DetailRecord, FetchError> {
    let url = self.endpoint(&format!("pokemon/{}", id))?;
    let pokemon: ApiPokemon = self.get_json(url).await?;
    Ok(pokemon.into_detail())
  }

  async fn fetch_species(&self, id: EntryId) -> Result<SpeciesInfo, FetchError> {
    let url = self.endpoint(&format!("pokemon-species/{}", id))?;
    let species: ApiSpecies = self.get_json(url).await?;
    Ok(species.into_species())
  }
}
