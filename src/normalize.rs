//! Turns the payloads of the remote API into canonical [`Restaurant`] and [`Cuisine`] values.
//!
//! The `/restaurants` collection shows up in two shapes:
//!
//! - a bare array of restaurant records
//! - the legacy wrapper, an array whose first element holds the real records
//!   under `restaurants` (a bare `{"restaurants": [...]}` object is accepted too)
//!
//! Records carry their identifier in `_id` (backend id), in `id`, or not at all.
//! The first present one wins, otherwise the 1-based position in the
//! normalized sequence is used.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::data::{Cuisine, MenuItem, Restaurant};

pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=400";

const CUISINE_IMAGES: &[(&str, &str)] = &[
    ("Italian", "https://images.unsplash.com/photo-1555939594-58d7cb561ad1?w=400"),
    ("Japanese", "https://images.unsplash.com/photo-1579584425555-c3ce17fd4351?w=400"),
    ("Mexican", "https://images.unsplash.com/photo-1565299585323-38174c2b3c44?w=400"),
    ("Chinese", "https://images.unsplash.com/photo-1526318896980-cf78c088247c?w=400"),
    ("French", "https://images.unsplash.com/photo-1414235077428-338989a2e8c0?w=400"),
    ("Indian", "https://images.unsplash.com/photo-1585937421612-70a008356fbe?w=400"),
    ("Thai", "https://images.unsplash.com/photo-1559314809-0d155014e29e?w=400"),
    ("Mediterranean", "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=400"),
    ("Korean", "https://images.unsplash.com/photo-1606787619248-f301830a5a57?w=400"),
    ("American", "https://images.unsplash.com/photo-1544025162-d76694265947?w=400"),
    ("Greek", "https://images.unsplash.com/photo-1551218808-94e220e084d2?w=400"),
    ("Spanish", "https://images.unsplash.com/photo-1555396273-367ea4eb4db5?w=400"),
    ("Vietnamese", "https://images.unsplash.com/photo-1559339352-11d035aa65de?w=400"),
];

/// Image for a cuisine name, exact match against the fixed table.
pub fn cuisine_image(name: &str) -> &'static str {
    CUISINE_IMAGES
        .iter()
        .find(|(cuisine, _)| *cuisine == name)
        .map(|(_, url)| *url)
        .unwrap_or(PLACEHOLDER_IMAGE)
}

/// Identifier as sent by the backend, json-server uses numbers and MockAPI strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    fn into_string(self) -> Option<String> {
        match self {
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s),
            Self::Number(n) => Some(n.to_string()),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Text(s) => s.trim().parse().ok(),
            Self::Number(n) => n.as_i64(),
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRestaurant {
    #[serde(rename = "_id", default)]
    backend_id: Option<WireId>,
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    image: String,
    #[serde(default, deserialize_with = "nullable")]
    rating: f64,
    #[serde(default, deserialize_with = "nullable")]
    cuisine_type: String,
    #[serde(default, deserialize_with = "nullable")]
    price_range: String,
    #[serde(default, deserialize_with = "nullable")]
    location: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    menu: Vec<RawMenuItem>,
}

#[derive(Debug, Deserialize)]
struct RawMenuItem {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    price: f64,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    category: String,
}

impl From<RawMenuItem> for MenuItem {
    fn from(raw: RawMenuItem) -> Self {
        Self {
            id: raw.id.as_ref().and_then(WireId::as_i64).unwrap_or_default(),
            name: raw.name,
            description: raw.description,
            price: raw.price,
            image: raw.image.filter(|url| !url.is_empty()),
            category: raw.category,
        }
    }
}

impl RawRestaurant {
    fn into_restaurant(self, fallback_id: impl FnOnce() -> String) -> Restaurant {
        let id = self
            .backend_id
            .and_then(WireId::into_string)
            .or_else(|| self.id.and_then(WireId::into_string))
            .unwrap_or_else(fallback_id);

        Restaurant {
            id,
            name: self.name,
            image: self.image,
            rating: self.rating,
            cuisine_type: self.cuisine_type,
            price_range: self.price_range,
            location: self.location,
            description: self.description,
            menu: self.menu.into_iter().map(MenuItem::from).collect(),
        }
    }
}

/// Shape of a restaurant collection response, detected before decoding records.
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantsPayload {
    Bare(Vec<Value>),
    Wrapped(Vec<Value>),
    Unrecognized,
}

impl RestaurantsPayload {
    pub fn detect(value: Value) -> Self {
        match value {
            Value::Array(mut items) => {
                let wrapped = items
                    .first()
                    .and_then(|first| first.get("restaurants"))
                    .is_some_and(Value::is_array);
                if !wrapped {
                    return Self::Bare(items);
                }
                match items.swap_remove(0) {
                    Value::Object(wrapper) => Self::from_wrapper(wrapper),
                    _ => Self::Unrecognized,
                }
            }
            Value::Object(wrapper) => Self::from_wrapper(wrapper),
            _ => Self::Unrecognized,
        }
    }

    fn from_wrapper(mut wrapper: serde_json::Map<String, Value>) -> Self {
        match wrapper.remove("restaurants") {
            Some(Value::Array(records)) => Self::Wrapped(records),
            _ => Self::Unrecognized,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::Wrapped(_))
    }

    /// Keep only the legacy records whose `cuisineType` equals `cuisine_type` exactly.
    ///
    /// The legacy backend ignores the cuisine query, bare payloads come back filtered
    /// already and are left alone.
    pub fn retain_cuisine(&mut self, cuisine_type: &str) {
        if let Self::Wrapped(records) = self {
            records.retain(|record| {
                record
                    .get("cuisineType")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    == cuisine_type
            });
        }
    }

    /// Decode every record and resolve its id. Unrecognized payloads yield no restaurants.
    pub fn into_restaurants(self) -> Result<Vec<Restaurant>, serde_json::Error> {
        let records = match self {
            Self::Bare(records) | Self::Wrapped(records) => records,
            Self::Unrecognized => return Ok(Vec::new()),
        };

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let raw: RawRestaurant = serde_json::from_value(record)?;
                Ok::<_, serde_json::Error>(raw.into_restaurant(|| (index + 1).to_string()))
            })
            .collect()
    }
}

/// Normalize a single `/restaurants/{id}` record.
///
/// Returns `Ok(None)` when the body holds no record at all (`null`, empty array, ...).
pub fn normalize_restaurant(
    value: Value,
    requested_id: &str,
) -> Result<Option<Restaurant>, serde_json::Error> {
    if !value.is_object() {
        return Ok(None);
    }
    let raw: RawRestaurant = serde_json::from_value(value)?;
    Ok(Some(raw.into_restaurant(|| requested_id.to_string())))
}

#[derive(Debug, Deserialize)]
struct RawCuisine {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    image: String,
}

/// Decode a dedicated `/cuisines` payload. Anything but an array decodes to no cuisines.
///
/// Ids stay unique within the result: a record without a numeric id, or repeating one
/// already used, gets the next id above the largest one in the payload.
pub fn decode_cuisines(value: Value) -> Result<Vec<Cuisine>, serde_json::Error> {
    let Value::Array(records) = value else {
        return Ok(Vec::new());
    };

    let raws = records
        .into_iter()
        .map(serde_json::from_value::<RawCuisine>)
        .collect::<Result<Vec<_>, _>>()?;

    let mut next = raws
        .iter()
        .filter_map(|raw| raw.id.as_ref().and_then(WireId::as_i64))
        .max()
        .unwrap_or(0)
        .max(0);
    let mut taken = HashSet::new();

    let cuisines = raws
        .into_iter()
        .map(|raw| {
            let id = match raw.id.as_ref().and_then(WireId::as_i64) {
                Some(id) if taken.insert(id) => id,
                _ => {
                    next += 1;
                    taken.insert(next);
                    next
                }
            };
            Cuisine {
                id,
                name: raw.name,
                image: raw.image,
            }
        })
        .collect();
    Ok(cuisines)
}

/// Build the cuisine list out of the restaurants' cuisine types.
///
/// First occurrence of every distinct non-empty cuisine type wins, ids count up from 1
/// in that order.
pub fn derive_cuisines(restaurants: &[Restaurant]) -> Vec<Cuisine> {
    let mut cuisines: Vec<Cuisine> = Vec::new();
    for restaurant in restaurants {
        let name = restaurant.cuisine_type.as_str();
        if name.is_empty() || cuisines.iter().any(|c| c.name == name) {
            continue;
        }
        cuisines.push(Cuisine {
            id: cuisines.len() as i64 + 1,
            name: name.to_string(),
            image: cuisine_image(name).to_string(),
        });
    }
    cuisines
}
