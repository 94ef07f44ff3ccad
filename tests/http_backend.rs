use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use actix_web::{web, App, HttpResponse, HttpServer};
use restaurant_discovery::{
    apply_filters,
    cache::{CacheKey, Tag},
    config::ConfigBuilder,
    filter::FilterStateBuilder,
    normalize::PLACEHOLDER_IMAGE,
    DataAccess,
};
use serde_json::{json, Value};

#[derive(Default)]
struct Hits {
    restaurants: AtomicUsize,
    cuisines: AtomicUsize,
}

fn fixture() -> Value {
    json!([
        {
            "id": "1",
            "name": "Sushi Go",
            "image": "sushi.png",
            "rating": 4.5,
            "cuisineType": "Japanese",
            "priceRange": "$$",
            "location": "Downtown",
            "description": "Conveyor belt sushi",
            "menu": [
                { "id": 1, "name": "Salmon Nigiri", "description": "", "price": 6.0, "category": "Nigiri" },
                { "id": 2, "name": "Miso Soup", "description": "", "price": 3.5, "category": "Sides" },
            ]
        },
        {
            "name": "Taco Town",
            "image": "taco.png",
            "rating": 3.8,
            "cuisineType": "Mexican",
            "priceRange": "$",
            "location": "Uptown",
            "description": "Street tacos",
            "menu": []
        },
        {
            "id": "3",
            "name": "Injera House",
            "image": "injera.png",
            "rating": 4.2,
            "cuisineType": "Ethiopian",
            "priceRange": "$$",
            "location": "Midtown",
            "description": "Shared platters",
            "menu": []
        }
    ])
}

async fn restaurants(
    hits: web::Data<Hits>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    hits.restaurants.fetch_add(1, Ordering::SeqCst);
    actix_web::rt::time::sleep(Duration::from_millis(50)).await;

    let Value::Array(all) = fixture() else {
        unreachable!()
    };
    let body: Vec<Value> = match query.get("cuisineType") {
        Some(cuisine) => all
            .into_iter()
            .filter(|r| r["cuisineType"] == cuisine.as_str())
            .collect(),
        None => all,
    };
    HttpResponse::Ok().json(body)
}

async fn restaurant(path: web::Path<String>) -> HttpResponse {
    let Value::Array(all) = fixture() else {
        unreachable!()
    };
    match all.into_iter().find(|r| r["id"] == path.as_str()) {
        Some(found) => HttpResponse::Ok().json(found),
        None => HttpResponse::NotFound().json("Not found"),
    }
}

async fn no_cuisines(hits: web::Data<Hits>) -> HttpResponse {
    hits.cuisines.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(json!([]))
}

/// Start a mock backend on an ephemeral port, returns its api root.
fn spawn_backend(hits: web::Data<Hits>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(hits.clone())
            .route("/api/v1/restaurants", web::get().to(restaurants))
            .route("/api/v1/restaurants/{id}", web::get().to(restaurant))
            .route("/api/v1/cuisines", web::get().to(no_cuisines))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let port = server.addrs()[0].port();
    actix_web::rt::spawn(server.run());
    format!("http://127.0.0.1:{port}/api/v1")
}

fn client(base_url: String) -> DataAccess {
    let config = ConfigBuilder::default()
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    DataAccess::from_config(&config).unwrap()
}

#[actix_web::test]
async fn test_concurrent_fetches_share_one_request() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits.clone()));

    let (a, b) = tokio::join!(api.fetch_all_restaurants(), api.fetch_all_restaurants());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a, b);
    assert_eq!(
        a.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );
    assert_eq!(hits.restaurants.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_browse_with_filters() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits));
    let all = api.fetch_all_restaurants().await.unwrap();

    let japanese = FilterStateBuilder::default()
        .cuisine("Japanese")
        .build()
        .unwrap();
    let found = apply_filters(&all, &japanese);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Sushi Go");

    let rated = FilterStateBuilder::default()
        .min_rating(4.0)
        .build()
        .unwrap();
    let found: Vec<_> = apply_filters(&all, &rated)
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(found, vec!["Sushi Go", "Injera House"]);
}

#[actix_web::test]
async fn test_cuisines_are_derived_when_resource_is_empty() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits.clone()));

    let cuisines = api.fetch_cuisines().await;
    let names: Vec<_> = cuisines.iter().map(|c| (c.id, c.name.as_str())).collect();
    assert_eq!(names, vec![(1, "Japanese"), (2, "Mexican"), (3, "Ethiopian")]);
    assert_eq!(cuisines[2].image, PLACEHOLDER_IMAGE);
    assert_ne!(cuisines[0].image, PLACEHOLDER_IMAGE);

    assert_eq!(api.fetch_cuisines().await, cuisines);
    assert_eq!(hits.cuisines.load(Ordering::SeqCst), 1);
    assert_eq!(hits.restaurants.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_restaurant_detail_and_not_found() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits));

    let sushi = api.fetch_restaurant_by_id("1").await.unwrap();
    let groups = sushi.menu_by_category();
    assert_eq!(
        groups.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
        vec!["Nigiri", "Sides"]
    );
    assert_eq!(groups[1].1[0].display_price(), "$3.50");

    let err = api.fetch_restaurant_by_id("99").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!api.is_cached(&CacheKey::RestaurantById("99".into())));
}

#[actix_web::test]
async fn test_restaurant_id_stays_one_path_segment() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits.clone()));

    for id in ["1?x=2", "1/reviews", "1#top"] {
        let err = api.fetch_restaurant_by_id(id).await.unwrap_err();
        assert!(err.is_not_found(), "{id}: {err}");
    }
    assert_eq!(hits.restaurants.load(Ordering::SeqCst), 0);
    assert_eq!(api.fetch_restaurant_by_id("1").await.unwrap().name, "Sushi Go");
}

#[actix_web::test]
async fn test_by_cuisine_query_and_invalidation() {
    let hits = web::Data::new(Hits::default());
    let api = client(spawn_backend(hits.clone()));

    let mexican = api.fetch_restaurants_by_cuisine("Mexican").await.unwrap();
    assert_eq!(mexican.len(), 1);
    assert_eq!(mexican[0].name, "Taco Town");

    api.fetch_restaurants_by_cuisine("Mexican").await.unwrap();
    assert_eq!(hits.restaurants.load(Ordering::SeqCst), 1);

    assert_eq!(api.invalidate(Tag::Restaurant), 1);
    api.fetch_restaurants_by_cuisine("Mexican").await.unwrap();
    assert_eq!(hits.restaurants.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let api = client("http://127.0.0.1:9/api/v1".to_string());

    let err = api.fetch_all_restaurants().await.unwrap_err();
    assert!(matches!(
        err,
        restaurant_discovery::FetchError::Transport { .. }
    ));
    assert!(api.fetch_cuisines().await.is_empty());
}
