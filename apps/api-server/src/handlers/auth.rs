//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::domain::User;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 6;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        created_at: Some(user.created_at.to_rfc3339()),
    }
}

fn issue_token(token_service: &dyn TokenService, user: &User) -> AppResult<AuthResponse> {
    let token = token_service
        .issue(user.id, &user.email, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.ttl_seconds().max(0) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    let mut errors = Vec::new();
    let username_len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        errors.push(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        ));
    }
    if email.is_empty() || !email.contains('@') {
        errors.push("Please provide a valid email".to_string());
    }
    if req.password.chars().count() < PASSWORD_MIN {
        errors.push(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors.join(", ")));
    }

    if state.users.find_by_email(&email).await?.is_some()
        || state.users.find_by_username(&username).await?.is_some()
    {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .insert(User::new(username, email, password_hash))
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let auth = issue_token(token_service.get_ref().as_ref(), &user)?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(auth)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .users
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(invalid());
    }

    let auth = issue_token(token_service.get_ref().as_ref(), &user)?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(auth)))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use serde_json::{Value, json};

    use super::*;

    macro_rules! init_app {
        () => {{
            let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
                secret: "auth-test-secret".to_string(),
                ..JwtConfig::default()
            }));
            let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::in_memory()))
                    .app_data(web::Data::new(tokens))
                    .app_data(web::Data::new(passwords))
                    .configure(crate::handlers::configure_routes),
            )
            .await
        }};
    }

    fn register_body(username: &str, email: &str) -> Value {
        json!({ "username": username, "email": email, "password": "password123" })
    }

    #[actix_web::test]
    async fn test_register_login_me() {
        let app = init_app!();

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("testuser", "test@example.com"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["user"]["role"], "user");

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "test@example.com", "password": "password123" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["username"], "testuser");
    }

    #[actix_web::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let app = init_app!();

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("testuser", "test@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("otheruser", "TEST@example.com"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "User already exists");

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": "ab", "email": "nope", "password": "123" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password() {
        let app = init_app!();

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register_body("testuser", "test@example.com"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "test@example.com", "password": "wrong-password" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let app = init_app!();

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
