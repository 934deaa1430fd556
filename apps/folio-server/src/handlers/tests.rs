use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, ResponseError, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use folio_core::domain::{Category, Post, User};
use folio_core::ports::{AuthError, PasswordService, TokenService};
use folio_infra::auth::{DEFAULT_ISSUER, JwtConfig};
use folio_infra::JwtTokenService;

use crate::config::SiteConfig;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// Password service that skips hashing cost.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-tests".to_string(),
        expiration_hours: 1,
        issuer: DEFAULT_ISSUER.to_string(),
    }))
}

fn password_service() -> Arc<dyn PasswordService> {
    Arc::new(PlainPasswords)
}

fn new_state() -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(SiteConfig::new(
        "https://blog.example.com",
        "Blog",
        "Posts",
    )))
}

macro_rules! init_app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(App::new().configure(move |cfg| {
            crate::configure_app(
                cfg,
                state,
                web::Data::new(token_service()),
                web::Data::new(password_service()),
            )
        }))
        .await
    }};
}

/// Store a user directly and mint a token for them.
async fn seed_user(state: &AppState, username: &str, staff: bool) -> (User, String) {
    let mut user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        PlainPasswords.hash("correct-horse").unwrap(),
    );
    user.is_staff = staff;
    let user = state.users.save(user).await.unwrap();
    let token = token_service()
        .generate_token(user.id, &user.username, user.roles())
        .unwrap();
    (user, token)
}

async fn seed_category(state: &AppState, name: &str) -> Category {
    state
        .categories
        .save(Category::new(name.to_string(), String::new(), String::new()))
        .await
        .unwrap()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn new_post(token: &str, title: &str, status: &str, category: &Category) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": title,
            "content": format!("All about {title}"),
            "category_id": category.id,
            "status": status,
        }))
}

#[actix_web::test]
async fn register_then_login_with_username_or_email() {
    let state = new_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "ada",
            "email": "Ada@Example.com",
            "password1": "correct-horse",
            "password2": "correct-horse",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["token_type"], "Bearer");

    let user_id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();
    assert!(state.profiles.find_by_user(user_id).await.unwrap().is_some());

    for login in ["ada", "ADA@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": login, "password": "correct-horse" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "ada", "password": "wrong-horse" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn username_containing_at_sign_can_log_in() {
    let state = new_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "ada@home",
            "email": "ada@example.com",
            "password1": "correct-horse",
            "password2": "correct-horse",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    for login in ["ada@home", "ada@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": login, "password": "correct-horse" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "{login}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["username"], "ada@home");
    }
}

#[actix_web::test]
async fn registering_a_taken_email_is_a_field_error() {
    let state = new_state();
    seed_user(&state, "ada", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "ada2",
            "email": "ADA@example.com",
            "password1": "correct-horse",
            "password2": "correct-horse",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"]["email"][0], "That email is already in use.");
}

#[actix_web::test]
async fn me_requires_a_token() {
    let state = new_state();
    let (_, token) = seed_user(&state, "ada", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "ada");
}

#[actix_web::test]
async fn draft_detail_is_hidden_from_everyone_but_author_and_staff() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, bob) = seed_user(&state, "bob", false).await;
    let (_, staff) = seed_user(&state, "editor", true).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    let created: Value = test::call_and_read_body_json(
        &app,
        new_post(&alice, "Secret", "draft", &category).to_request(),
    )
    .await;
    assert_eq!(created["slug"], "secret");
    assert!(created["published_at"].is_null());
    let uri = "/api/posts/secret";

    let anon = test::TestRequest::get().uri(uri).to_request();
    assert_eq!(test::call_service(&app, anon).await.status(), StatusCode::NOT_FOUND);

    let other = test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, other).await.status(), StatusCode::NOT_FOUND);

    let author = test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, author).await;
    assert_eq!(body["is_preview"], true);
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["category"]["slug"], "rust");

    let editor = test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(&staff))
        .to_request();
    assert_eq!(test::call_service(&app, editor).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn search_never_includes_another_users_draft() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, bob) = seed_user(&state, "bob", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    test::call_service(
        &app,
        new_post(&alice, "Ownership draft", "draft", &category).to_request(),
    )
    .await;
    test::call_service(
        &app,
        new_post(&bob, "Ownership guide", "published", &category).to_request(),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/posts?q=OWNERSHIP")
        .insert_header(bearer(&bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Ownership guide");
    assert_eq!(body["items"][0]["category"]["name"], "Rust");

    let req = test::TestRequest::get()
        .uri("/api/me/posts")
        .insert_header(bearer(&alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["status"], "draft");
}

#[actix_web::test]
async fn duplicate_published_title_is_rejected_but_drafts_may_collide() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, bob) = seed_user(&state, "bob", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    let res = test::call_service(
        &app,
        new_post(&alice, "Hello World", "published", &category).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        new_post(&bob, "hello world", "published", &category).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"][0].as_str().is_some());

    let body: Value = test::call_and_read_body_json(
        &app,
        new_post(&bob, "Hello World", "draft", &category).to_request(),
    )
    .await;
    assert_eq!(body["slug"], "hello-world-2");
}

#[actix_web::test]
async fn slug_taken_between_check_and_save_is_a_field_error() {
    let state = new_state();
    let (alice, _) = seed_user(&state, "alice", false).await;
    let category = seed_category(&state, "Rust").await;

    let mut winner = Post::new(alice.id, category.id, "Race".into(), "Body".into());
    winner.slug = Some("race".into());
    state.posts.save(winner).await.unwrap();

    let mut loser = Post::new(alice.id, category.id, "Race again".into(), "Body".into());
    loser.slug = Some("race".into());
    let err = AppError::from(state.posts.save(loser).await.unwrap_err());

    assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    match err {
        AppError::Validation(errors) => assert!(errors.contains_key("slug")),
        other => panic!("unexpected {other:?}"),
    }
}

#[actix_web::test]
async fn edits_keep_the_slug_and_first_publication_time() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    let created: Value = test::call_and_read_body_json(
        &app,
        new_post(&alice, "First title", "published", &category).to_request(),
    )
    .await;
    let first_published = created["published_at"].clone();
    assert!(!first_published.is_null());

    for (title, status) in [("Second title", "draft"), ("Third title", "published")] {
        let req = test::TestRequest::put()
            .uri("/api/posts/first-title")
            .insert_header(bearer(&alice))
            .set_json(json!({
                "title": title,
                "content": "Body",
                "category_id": category.id,
                "status": status,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["slug"], "first-title");
        assert_eq!(body["title"], title);
        assert_eq!(body["published_at"], first_published);
    }
}

#[actix_web::test]
async fn only_the_author_may_edit_or_delete() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, staff) = seed_user(&state, "editor", true).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    test::call_service(&app, new_post(&alice, "Mine", "published", &category).to_request()).await;

    let req = test::TestRequest::delete()
        .uri("/api/posts/mine")
        .insert_header(bearer(&staff))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/posts/mine")
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn categories_are_staff_managed_and_protected_while_used() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, staff) = seed_user(&state, "editor", true).await;
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&alice))
        .set_json(json!({ "name": "Systems Programming" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&staff))
        .set_json(json!({ "name": "Systems Programming" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["slug"], "systems-programming");

    let category = state
        .categories
        .find_by_slug("systems-programming")
        .await
        .unwrap()
        .unwrap();
    test::call_service(&app, new_post(&alice, "Pinned", "published", &category).to_request()).await;

    let req = test::TestRequest::delete()
        .uri("/api/categories/systems-programming")
        .insert_header(bearer(&staff))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/categories/systems-programming")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"]["total"], 1);
}

#[actix_web::test]
async fn comments_reject_spam_and_respect_delete_rights() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let (_, bob) = seed_user(&state, "bob", false).await;
    let (_, carol) = seed_user(&state, "carol", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    test::call_service(&app, new_post(&alice, "Talk", "published", &category).to_request()).await;

    let req = test::TestRequest::post()
        .uri("/api/posts/talk/comments")
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "cheap pills", "website": "http://spam.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/posts/talk/comments")
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "Nice post" }))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&carol))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // The post's author may remove comments on it.
    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn out_of_range_pages_fall_back() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    for i in 0..7 {
        let title = format!("Post {i}");
        test::call_service(
            &app,
            new_post(&alice, &title, "published", &category).to_request(),
        )
        .await;
    }

    let req = test::TestRequest::get().uri("/api/posts?page=42").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["has_next"], true);
}

#[actix_web::test]
async fn profile_edit_creates_the_profile_on_demand() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let app = init_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .insert_header(bearer(&alice))
        .set_json(json!({ "bio": "Rustacean", "location": "Lisbon" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["location"], "Lisbon");

    let req = test::TestRequest::get().uri("/api/users/alice").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["bio"], "Rustacean");
    assert_eq!(body["posts"]["total"], 0);
}

#[actix_web::test]
async fn feeds_list_only_published_posts() {
    let state = new_state();
    let (_, alice) = seed_user(&state, "alice", false).await;
    let category = seed_category(&state, "Rust").await;
    let app = init_app!(state);

    test::call_service(
        &app,
        new_post(&alice, "Live post", "published", &category).to_request(),
    )
    .await;
    test::call_service(
        &app,
        new_post(&alice, "Hidden draft", "draft", &category).to_request(),
    )
    .await;

    for uri in ["/feed/", "/feed/atom/", "/sitemap.xml"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body = test::call_and_read_body(&app, req).await;
        let xml = String::from_utf8(body.to_vec()).unwrap();
        assert!(xml.contains("https://blog.example.com/post/live-post/"), "{uri}");
        assert!(!xml.contains("hidden-draft"), "{uri}");
    }

    let req = test::TestRequest::get().uri("/robots.txt").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8(body.to_vec())
        .unwrap()
        .contains("Sitemap: https://blog.example.com/sitemap.xml"));
}
