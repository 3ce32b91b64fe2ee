extern crate dotenv;

pub mod app;
pub mod config;
pub mod database;

mod auth;
mod routes;

use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use crate::{
    app::AppState,
    auth::token::SessionTokens,
    config::Config,
    database::db_utils::open_store,
    routes::{blog::*, comment::*, index, json_config, token::*, user::*, wishlist::*},
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        error!("{}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    let store = open_store(&config).map_err(|err| {
        error!("Could not open the store: {}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;
    match store.ping() {
        Ok(()) => info!("Pinged your deployment. You successfully connected to the store!"),
        Err(err) => warn!("Store ping failed: {}", err),
    }

    let app_state = AppState::new(store, SessionTokens::new(config.access_token_secret.as_bytes()));
    let client_origin = config.client_origin.clone();

    info!("Server is running on PORT: {}", config.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(Data::new(app_state.clone()))
            .app_data(json_config())
            .service(index)
            //Auth routes
            .service(issue_token)
            .service(logout)
            //User routes
            .service(get_user)
            .service(create_new_user)
            //Blog routes
            .service(get_blogs)
            .service(create_new_blog)
            .service(get_recent_blogs)
            .service(get_featured_blogs)
            .service(get_blog)
            //Wishlist routes
            .service(get_wishlist)
            .service(add_to_wishlist)
            //Comment routes
            .service(get_comments)
            .service(create_comment)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
