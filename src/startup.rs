use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::RefreshRegistry;
use crate::configuration::AuthSettings;
use crate::events::EventBus;
use crate::middleware::{AuthMiddleware, RequestLogger};
use crate::routes::{
    create_category, create_expense, create_labour_type, create_labour_works, create_loan,
    create_sub_category, create_unit_type, delete_category, delete_expense, delete_labour_type,
    delete_labour_works, delete_loan, delete_sub_category, delete_unit_type, get_expense,
    health_check, list_categories, list_expenses, list_labour_types, list_labour_works,
    list_loans, list_sub_categories, list_unit_types, login, me, refresh, update_category,
    update_expense, update_labour_work, update_sub_category,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    auth_config: AuthSettings,
    registry: web::Data<RefreshRegistry>,
    events: web::Data<EventBus>,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let auth_config_data = web::Data::new(auth_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(auth_config_data.clone())
            .app_data(registry.clone())
            .app_data(events.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))

            // Data routes (access token required)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(auth_config.clone()))
                    .route("/me", web::get().to(me))
                    .route("/categories", web::get().to(list_categories))
                    .route("/categories", web::post().to(create_category))
                    .route("/categories/{id}", web::patch().to(update_category))
                    .route("/categories/{id}", web::delete().to(delete_category))
                    .route("/sub-categories", web::get().to(list_sub_categories))
                    .route("/sub-categories", web::post().to(create_sub_category))
                    .route("/sub-categories/{id}", web::patch().to(update_sub_category))
                    .route("/sub-categories/{id}", web::delete().to(delete_sub_category))
                    .route("/expenses", web::get().to(list_expenses))
                    .route("/expenses", web::post().to(create_expense))
                    .route("/expenses/{id}", web::get().to(get_expense))
                    .route("/expenses/{id}", web::patch().to(update_expense))
                    .route("/expenses/{id}", web::delete().to(delete_expense))
                    .route("/loans", web::get().to(list_loans))
                    .route("/loans", web::post().to(create_loan))
                    .route("/loans/{id}", web::delete().to(delete_loan))
                    .route("/unit-types", web::get().to(list_unit_types))
                    .route("/unit-types", web::post().to(create_unit_type))
                    .route("/unit-types/{id}", web::delete().to(delete_unit_type))
                    .route("/labour-types", web::get().to(list_labour_types))
                    .route("/labour-types", web::post().to(create_labour_type))
                    .route("/labour-types/{id}", web::delete().to(delete_labour_type))
                    .route("/labour-works", web::get().to(list_labour_works))
                    .route("/labour-works", web::post().to(create_labour_works))
                    .route("/labour-works", web::delete().to(delete_labour_works))
                    .route("/labour-works/{id}", web::patch().to(update_labour_work)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
