use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheKey, QueryCache, Tag},
    config::Config,
    data::{Cuisine, Restaurant},
    error::FetchError,
    normalize::{self, RestaurantsPayload},
    transport::{HttpTransport, RawResponse, Transport},
};

pub type Restaurants = Arc<Vec<Restaurant>>;
pub type Cuisines = Arc<Vec<Cuisine>>;

/// Read-only access to the restaurant API with caching.
///
/// Every operation goes through its own cache entry, concurrent calls for the same
/// entry share one request.
pub struct DataAccess {
    transport: Arc<dyn Transport>,
    restaurants: QueryCache<Restaurants>,
    restaurant: QueryCache<Arc<Restaurant>>,
    cuisines: QueryCache<Cuisines>,
}

impl DataAccess {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            restaurants: QueryCache::new(),
            restaurant: QueryCache::new(),
            cuisines: QueryCache::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub async fn fetch_all_restaurants(&self) -> Result<Restaurants, FetchError> {
        self.restaurants
            .get_or_fetch(CacheKey::AllRestaurants, move || async move {
                let body = self.get_json(&["restaurants"], &[]).await?;
                let restaurants = decode_restaurants(&body.url, body.value, None)?;
                info!("fetched {} restaurants", restaurants.len());
                Ok::<_, FetchError>(Arc::new(restaurants))
            })
            .await
    }

    pub async fn fetch_restaurant_by_id(&self, id: &str) -> Result<Arc<Restaurant>, FetchError> {
        let key = CacheKey::RestaurantById(id.to_string());
        self.restaurant
            .get_or_fetch(key, move || async move {
                let resp = self.transport.get(&["restaurants", id], &[]).await?;
                if resp.status == 404 {
                    return Err(FetchError::NotFound { id: id.to_string() });
                }
                let body = JsonBody::parse(resp)?;

                normalize::normalize_restaurant(body.value, id)
                    .map_err(|source| FetchError::Decode {
                        url: body.url,
                        source,
                    })?
                    .map(Arc::new)
                    .ok_or_else(|| FetchError::NotFound { id: id.to_string() })
            })
            .await
    }

    /// All cuisines, derived from the restaurants when the backend has no usable
    /// `/cuisines` resource. Never fails, the worst case is an empty list.
    pub async fn fetch_cuisines(&self) -> Cuisines {
        let result = self
            .cuisines
            .get_or_fetch(CacheKey::Cuisines, move || async move {
                Ok::<_, FetchError>(Arc::new(self.load_cuisines().await))
            })
            .await;

        result.unwrap_or_default()
    }

    async fn load_cuisines(&self) -> Vec<Cuisine> {
        match self.get_json(&["cuisines"], &[]).await {
            Ok(body) => match normalize::decode_cuisines(body.value) {
                Ok(cuisines) if !cuisines.is_empty() => {
                    info!("fetched {} cuisines", cuisines.len());
                    return cuisines;
                }
                Ok(_) => debug!("cuisine resource is empty"),
                Err(e) => warn!("malformed cuisine resource from {}: {e}", body.url),
            },
            Err(e) => debug!("cuisine resource unavailable: {e}"),
        }

        warn!("deriving cuisines from restaurants");
        match self.fetch_all_restaurants().await {
            Ok(restaurants) => normalize::derive_cuisines(&restaurants),
            Err(e) => {
                warn!("fail to derive cuisines: {e}");
                Vec::new()
            }
        }
    }

    pub async fn fetch_restaurants_by_cuisine(
        &self,
        cuisine_type: &str,
    ) -> Result<Restaurants, FetchError> {
        let key = CacheKey::RestaurantsByCuisine(cuisine_type.to_string());
        self.restaurants
            .get_or_fetch(key, move || async move {
                let body = self
                    .get_json(&["restaurants"], &[("cuisineType", cuisine_type)])
                    .await?;
                let restaurants = decode_restaurants(&body.url, body.value, Some(cuisine_type))?;
                info!("fetched {} {cuisine_type} restaurants", restaurants.len());
                Ok::<_, FetchError>(Arc::new(restaurants))
            })
            .await
    }

    /// Drop every cached entry carrying `tag`. Returns how many entries were dropped.
    pub fn invalidate(&self, tag: Tag) -> usize {
        self.restaurants.invalidate(tag)
            + self.restaurant.invalidate(tag)
            + self.cuisines.invalidate(tag)
    }

    pub fn is_cached(&self, key: &CacheKey) -> bool {
        match key {
            CacheKey::AllRestaurants | CacheKey::RestaurantsByCuisine(_) => {
                self.restaurants.contains(key)
            }
            CacheKey::RestaurantById(_) => self.restaurant.contains(key),
            CacheKey::Cuisines => self.cuisines.contains(key),
        }
    }

    async fn get_json(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<JsonBody, FetchError> {
        let resp = self.transport.get(path, query).await?;
        JsonBody::parse(resp)
    }
}

struct JsonBody {
    url: String,
    value: Value,
}

impl JsonBody {
    /// Reject non-success responses, then parse the body as JSON.
    fn parse(resp: RawResponse) -> Result<Self, FetchError> {
        if !resp.is_success() {
            return Err(FetchError::status(resp.url, resp.status, &resp.body));
        }

        let value = if resp.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&resp.body).map_err(|source| FetchError::Decode {
                url: resp.url.clone(),
                source,
            })?
        };

        Ok(Self {
            url: resp.url,
            value,
        })
    }
}

/// Normalize a restaurant collection. With `cuisine` set, legacy wrapped payloads are
/// filtered here since the backend did not filter them. Positional ids are assigned
/// after that filter.
fn decode_restaurants(
    url: &str,
    value: Value,
    cuisine: Option<&str>,
) -> Result<Vec<Restaurant>, FetchError> {
    let mut payload = RestaurantsPayload::detect(value);
    if matches!(payload, RestaurantsPayload::Unrecognized) {
        warn!("unrecognized restaurant payload from {url}");
    }
    if let Some(cuisine) = cuisine {
        payload.retain_cuisine(cuisine);
    }

    payload
        .into_restaurants()
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
}
