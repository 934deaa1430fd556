//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod feeds;
mod forms;
mod health;
mod posts;
mod present;
mod profiles;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{slug}", web::get().to(posts::detail))
                    .route("/{slug}", web::put().to(posts::update))
                    .route("/{slug}", web::delete().to(posts::delete))
                    .route("/{slug}/comments", web::post().to(comments::create)),
            )
            .route("/comments/{id}", web::delete().to(comments::delete))
            .route("/me/posts", web::get().to(posts::mine))
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/{slug}", web::get().to(categories::detail))
                    .route("/{slug}", web::put().to(categories::update))
                    .route("/{slug}", web::delete().to(categories::delete)),
            )
            .route("/users/{username}", web::get().to(profiles::show))
            .route("/profile", web::put().to(profiles::update)),
    )
    // Syndication
    .route("/feed/", web::get().to(feeds::rss))
    .route("/feed/atom/", web::get().to(feeds::atom))
    .route("/sitemap.xml", web::get().to(feeds::sitemap))
    .route("/robots.txt", web::get().to(feeds::robots));
}
