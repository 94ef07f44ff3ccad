use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Resolved identifier, see [`crate::normalize`].
    pub id: String,
    pub name: String,
    /// url to the cover image
    pub image: String,
    /// 0 to 5
    pub rating: f64,
    pub cuisine_type: String,
    /// One of the price tier symbols, `$`, `$$` or `$$$`.
    pub price_range: String,
    pub location: String,
    pub description: String,
    pub menu: Vec<MenuItem>,
}

impl Restaurant {
    /// Group the menu by category, keeping the order in which each category first shows up.
    pub fn menu_by_category(&self) -> Vec<(&str, Vec<&MenuItem>)> {
        let mut groups: Vec<(&str, Vec<&MenuItem>)> = Vec::new();
        for item in &self.menu {
            match groups.iter_mut().find(|(c, _)| *c == item.category) {
                Some((_, items)) => items.push(item),
                None => groups.push((&item.category, vec![item])),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
}

impl MenuItem {
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuisine {
    pub id: i64,
    pub name: String,
    pub image: String,
}
