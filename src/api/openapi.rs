//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, genres, health, home, instances, languages, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Library catalog REST API: books, authors, copies and loans"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        home::home,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Languages
        languages::list_languages,
        languages::get_language,
        languages::create_language,
        languages::update_language,
        languages::delete_language,
        // Copies
        instances::get_instance,
        instances::create_instance,
        instances::update_instance,
        instances::delete_instance,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::get_renewal,
        loans::renew_instance,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetail,
            crate::models::book::BookInput,
            books::BookPage,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorInput,
            books::AuthorPage,
            // Genres and languages
            crate::models::genre::Genre,
            crate::models::genre::Language,
            crate::models::genre::NameInput,
            // Copies and loans
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::InstanceView,
            crate::models::book_instance::InstanceInput,
            crate::models::book_instance::RenewInput,
            crate::models::book_instance::RenewalProposal,
            loans::RenewalResponse,
            books::LoanPage,
            // Home
            crate::models::home::CatalogCounts,
            home::HomeResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "home", description = "Home page counters"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Authors"),
        (name = "genres", description = "Genres"),
        (name = "languages", description = "Languages"),
        (name = "instances", description = "Book copies"),
        (name = "loans", description = "Loan listings and renewals")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
