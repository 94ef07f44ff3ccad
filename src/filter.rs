//! User chosen filters over the restaurant collection.
//!
//! [`apply_filters`] is the whole derivation, [`FilterView`] only owns the state and
//! tells subscribers when it changed so they can derive again.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::data::Restaurant;

/// Price tiers offered to the user, with their labels.
pub const PRICE_TIERS: &[(&str, &str)] = &[
    ("$", "Budget Friendly"),
    ("$$", "Moderate"),
    ("$$$", "Expensive"),
];

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;
pub const RATING_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTier {
    pub symbol: &'static str,
    pub label: &'static str,
}

/// The choices a filter panel offers: price tiers and the rating slider bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub price_tiers: Vec<PriceTier>,
    pub rating_min: f64,
    pub rating_max: f64,
    pub rating_step: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            price_tiers: PRICE_TIERS
                .iter()
                .map(|&(symbol, label)| PriceTier { symbol, label })
                .collect(),
            rating_min: RATING_MIN,
            rating_max: RATING_MAX,
            rating_step: RATING_STEP,
        }
    }
}

#[derive(Builder, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    #[builder(setter(into), default)]
    pub search: String,
    #[builder(setter(into, strip_option), default)]
    pub cuisine: Option<String>,
    #[builder(setter(into, strip_option), default)]
    pub price: Option<String>,
    #[builder(setter(strip_option), default)]
    pub min_rating: Option<f64>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn matches_search(&self, restaurant: &Restaurant) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let query = self.search.to_lowercase();
        [
            &restaurant.name,
            &restaurant.cuisine_type,
            &restaurant.description,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
    }

    fn matches_cuisine(&self, restaurant: &Restaurant) -> bool {
        self.cuisine
            .as_deref()
            .map_or(true, |c| restaurant.cuisine_type.to_lowercase() == c.to_lowercase())
    }

    fn matches_price(&self, restaurant: &Restaurant) -> bool {
        self.price
            .as_deref()
            .map_or(true, |p| restaurant.price_range == p)
    }

    /// `0` and non-finite thresholds mean no rating filter.
    fn matches_rating(&self, restaurant: &Restaurant) -> bool {
        match self.min_rating {
            Some(min) if min.is_finite() && min != 0.0 => restaurant.rating >= min,
            _ => true,
        }
    }
}

/// Narrow `restaurants` by every active filter: search, cuisine, price, then rating.
///
/// Input order is preserved.
pub fn apply_filters(restaurants: &[Restaurant], filters: &FilterState) -> Vec<Restaurant> {
    let mut filtered: Vec<&Restaurant> = restaurants.iter().collect();
    filtered.retain(|r| filters.matches_search(r));
    filtered.retain(|r| filters.matches_cuisine(r));
    filtered.retain(|r| filters.matches_price(r));
    filtered.retain(|r| filters.matches_rating(r));
    filtered.into_iter().cloned().collect()
}

/// Group restaurants by cuisine type, in the order each cuisine first shows up.
pub fn group_by_cuisine(restaurants: &[Restaurant]) -> Vec<(String, Vec<Restaurant>)> {
    let mut groups: Vec<(String, Vec<Restaurant>)> = Vec::new();
    for restaurant in restaurants {
        match groups
            .iter_mut()
            .find(|(cuisine, _)| *cuisine == restaurant.cuisine_type)
        {
            Some((_, members)) => members.push(restaurant.clone()),
            None => groups.push((restaurant.cuisine_type.clone(), vec![restaurant.clone()])),
        }
    }
    groups
}

/// The restaurant shown in the hero spot, the first one of the unfiltered collection.
pub fn featured(restaurants: &[Restaurant]) -> Option<&Restaurant> {
    restaurants.first()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Owner of the current [`FilterState`].
///
/// Every mutation is published to subscribers, they re-run [`apply_filters`] with
/// whatever restaurant data they hold at that moment.
pub struct FilterView {
    state: watch::Sender<FilterState>,
}

impl Default for FilterView {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterView {
    pub fn new() -> Self {
        let (state, _) = watch::channel(FilterState::default());
        Self { state }
    }

    pub fn state(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.update(|s| s.search = search);
    }

    /// `None` or an empty string clears the cuisine filter.
    pub fn set_cuisine(&self, cuisine: Option<String>) {
        self.update(|s| s.cuisine = non_empty(cuisine));
    }

    /// `None` or an empty string clears the price filter.
    pub fn set_price(&self, price: Option<String>) {
        self.update(|s| s.price = non_empty(price));
    }

    pub fn set_min_rating(&self, min_rating: Option<f64>) {
        self.update(|s| s.min_rating = min_rating);
    }

    pub fn clear(&self) {
        self.update(|s| *s = FilterState::default());
    }

    pub fn apply(&self, restaurants: &[Restaurant]) -> Vec<Restaurant> {
        apply_filters(restaurants, &self.state.borrow())
    }

    fn update(&self, f: impl FnOnce(&mut FilterState)) {
        self.state.send_modify(|state| {
            f(state);
            debug!(?state, "filters changed");
        });
    }
}
