use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, web, App, HttpServer};

use todo_api::auth::{AuthMiddleware, TokenVerifier};
use todo_api::repository::{InMemoryTaskRepository, PgTaskRepository, TaskRepository};
use todo_api::routes::{self, health};
use todo_api::{AppError, Config, TaskService};

fn cors(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600)
}

async fn repository(config: &Config) -> Result<Arc<dyn TaskRepository>, AppError> {
    match &config.database_url {
        Some(url) => {
            let repo = PgTaskRepository::connect(url, config.database_max_connections).await?;
            Ok(Arc::new(repo))
        }
        None => {
            log::warn!("DATABASE_URL not set; tasks are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryTaskRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let verifier = Arc::new(TokenVerifier::new(config.auth_secret.as_deref()));
    if !verifier.is_configured() {
        log::error!("BETTER_AUTH_SECRET is not set; every task request will fail until it is configured");
    }

    let repo = repository(&config).await.map_err(std::io::Error::other)?;
    let service = web::Data::new(TaskService::new(repo));

    log::info!(
        "starting server at {} with {} storage",
        config.server_url(),
        service.backend()
    );

    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(Arc::clone(&verifier)))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
