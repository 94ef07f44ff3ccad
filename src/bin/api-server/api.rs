use actix_web::{http::StatusCode, web, HttpResponse};
use anyhow::Context;
use restaurant_discovery::{
    data::{Cuisine, MenuItem, Restaurant},
    filter::{self, FilterOptions},
    Config, DataAccess, FetchError, FilterState,
};
use serde::{Deserialize, Serialize};

pub(super) struct ApiState {
    access: DataAccess,
}

impl ApiState {
    pub(super) fn new(config: &Config) -> anyhow::Result<Self> {
        let access = DataAccess::from_config(config).context("fail to build api client")?;
        Ok(Self { access })
    }
}

#[derive(Serialize)]
struct ErrJsonResp {
    headline: &'static str,
    message: String,
}

fn error_response(err: FetchError) -> HttpResponse {
    tracing::error!("{err}");
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    };
    HttpResponse::build(status).json(ErrJsonResp {
        headline: err.headline(),
        message: err.to_string(),
    })
}

#[derive(Deserialize)]
pub(super) struct BrowseQuery {
    search: Option<String>,
    cuisine: Option<String>,
    price: Option<String>,
    rating: Option<f64>,
}

impl From<BrowseQuery> for FilterState {
    fn from(query: BrowseQuery) -> Self {
        let non_empty = |v: Option<String>| v.filter(|v| !v.is_empty());
        Self {
            search: query.search.unwrap_or_default(),
            cuisine: non_empty(query.cuisine),
            price: non_empty(query.price),
            min_rating: query.rating,
        }
    }
}

#[actix_web::get("/api/v1/restaurants")]
pub(super) async fn restaurants(
    data: web::Data<ApiState>,
    query: web::Query<BrowseQuery>,
) -> HttpResponse {
    let filters = FilterState::from(query.into_inner());
    match data.access.fetch_all_restaurants().await {
        Ok(all) => HttpResponse::Ok().json(filter::apply_filters(&all, &filters)),
        Err(err) => error_response(err),
    }
}

#[derive(Serialize)]
struct MenuGroup<'a> {
    category: &'a str,
    items: Vec<&'a MenuItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantDetail<'a> {
    #[serde(flatten)]
    restaurant: &'a Restaurant,
    menu_by_category: Vec<MenuGroup<'a>>,
}

#[actix_web::get("/api/v1/restaurants/{id}")]
pub(super) async fn restaurant(data: web::Data<ApiState>, path: web::Path<String>) -> HttpResponse {
    let result = data.access.fetch_restaurant_by_id(&path).await;
    let restaurant = match result {
        Ok(restaurant) => restaurant,
        Err(err) => return error_response(err),
    };

    let menu_by_category = restaurant
        .menu_by_category()
        .into_iter()
        .map(|(category, items)| MenuGroup { category, items })
        .collect();
    HttpResponse::Ok().json(RestaurantDetail {
        restaurant: &restaurant,
        menu_by_category,
    })
}

#[actix_web::get("/api/v1/cuisines")]
pub(super) async fn cuisines(data: web::Data<ApiState>) -> HttpResponse {
    HttpResponse::Ok().json(data.access.fetch_cuisines().await.as_slice())
}

#[actix_web::get("/api/v1/cuisines/{cuisine}/restaurants")]
pub(super) async fn cuisine_restaurants(
    data: web::Data<ApiState>,
    path: web::Path<String>,
) -> HttpResponse {
    match data.access.fetch_restaurants_by_cuisine(&path).await {
        Ok(list) => HttpResponse::Ok().json(list.as_slice()),
        Err(err) => error_response(err),
    }
}

#[derive(Serialize)]
struct CuisineRow {
    cuisine: String,
    restaurants: Vec<Restaurant>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Home<'a> {
    featured: Option<&'a Restaurant>,
    cuisines: &'a [Cuisine],
    rows: Vec<CuisineRow>,
    filter_options: FilterOptions,
}

#[actix_web::get("/api/v1/home")]
pub(super) async fn home(data: web::Data<ApiState>, query: web::Query<BrowseQuery>) -> HttpResponse {
    let filters = FilterState::from(query.into_inner());
    let (all_restaurants, all_cuisines) = tokio::join!(
        data.access.fetch_all_restaurants(),
        data.access.fetch_cuisines()
    );
    let all_restaurants = match all_restaurants {
        Ok(list) => list,
        Err(err) => return error_response(err),
    };

    let filtered = filter::apply_filters(&all_restaurants, &filters);
    let rows = filter::group_by_cuisine(&filtered)
        .into_iter()
        .map(|(cuisine, list)| CuisineRow {
            cuisine,
            restaurants: list,
        })
        .collect();

    HttpResponse::Ok().json(Home {
        featured: filter::featured(&all_restaurants),
        cuisines: &all_cuisines,
        rows,
        filter_options: FilterOptions::default(),
    })
}
