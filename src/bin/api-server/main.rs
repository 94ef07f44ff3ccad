use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use restaurant_discovery::Config;

mod api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(true)
        .with_file(false)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("fail to setup logging")?;

    let config = Config::from_env();
    tracing::info!(
        "serving {} on {}:{}",
        config.base_url,
        config.bind_addr,
        config.port
    );
    let state = web::Data::new(api::ApiState::new(&config)?);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allow_any_method()
                    .allow_any_origin(),
            )
            .app_data(state.clone())
            .service(api::restaurants)
            .service(api::restaurant)
            .service(api::cuisines)
            .service(api::cuisine_restaurants)
            .service(api::home)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
