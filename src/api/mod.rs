// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::middleware::{require_admin, require_user};
use crate::auth::AuthenticatedAdmin;
use crate::models::{ApprovalStatus, NotificationType};
use crate::state::AppState;
use crate::storage::{
    NotificationData, NotificationPage, StoredCampaign, StoredCompany, StoredNotification,
    UserProfile,
};

pub mod admin_auth;
pub mod campaigns;
pub mod companies;
pub mod extract;
pub mod health;
pub mod notifications;
pub mod user_auth;
pub mod user_companies;
pub mod webauthn;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(admin_auth::login))
        .route(
            "/auth/webauthn/authenticate/options",
            post(webauthn::authentication_options),
        )
        .route(
            "/auth/webauthn/authenticate/verify",
            post(webauthn::verify_authentication),
        )
        .route("/users/register", post(user_auth::register))
        .route("/users/login", post(user_auth::login))
        .route("/users/verify-email", post(user_auth::verify_email))
        .route("/users/resend-email", post(user_auth::resend_email));

    let admin_routes = Router::new()
        .route(
            "/auth/webauthn/register/options",
            post(webauthn::registration_options),
        )
        .route(
            "/auth/webauthn/register/verify",
            post(webauthn::verify_registration),
        )
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route("/companies/pending", get(companies::list_pending))
        .route("/companies/approved", get(companies::list_approved))
        .route("/companies/denied", get(companies::list_denied))
        .route("/companies/{id}", get(companies::get_company))
        .route("/companies/{id}/approve", post(companies::approve_company))
        .route("/companies/{id}/deny", post(companies::deny_company))
        .route(
            "/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/campaigns/company/{company_id}",
            get(campaigns::list_company_campaigns),
        )
        .route(
            "/campaigns/company/{company_id}/pending",
            get(campaigns::list_company_pending),
        )
        .route(
            "/campaigns/company/{company_id}/approved",
            get(campaigns::list_company_approved),
        )
        .route(
            "/campaigns/company/{company_id}/denied",
            get(campaigns::list_company_denied),
        )
        .route("/campaigns/{id}", get(campaigns::get_campaign))
        .route("/campaigns/{id}/approve", post(campaigns::approve_campaign))
        .route("/campaigns/{id}/deny", post(campaigns::deny_campaign))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let user_routes = Router::new()
        .route(
            "/user/companies",
            get(user_companies::list_my_companies).post(user_companies::create_my_company),
        )
        .route("/user/companies/{id}", get(user_companies::get_my_company))
        .route("/user/companies/{id}/kyc", patch(user_companies::update_kyc))
        .route(
            "/user/companies/{id}/campaigns",
            get(user_companies::list_campaigns).post(user_companies::create_campaign),
        )
        .route(
            "/user/companies/{id}/campaigns/{campaign_id}",
            get(user_companies::get_campaign),
        )
        .route("/user/notifications", get(notifications::list_notifications))
        .route("/user/notifications/{id}/read", patch(notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let api_routes = public_routes.merge(admin_routes).merge(user_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
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

#[derive(OpenApi)]
#[openapi(
    info(title = "InvestHub API"),
    modifiers(&BearerAuth),
    paths(
        health::health,
        admin_auth::login,
        webauthn::registration_options,
        webauthn::verify_registration,
        webauthn::authentication_options,
        webauthn::verify_authentication,
        user_auth::register,
        user_auth::login,
        user_auth::verify_email,
        user_auth::resend_email,
        companies::create_company,
        companies::list_companies,
        companies::list_pending,
        companies::list_approved,
        companies::list_denied,
        companies::get_company,
        companies::approve_company,
        companies::deny_company,
        user_companies::list_my_companies,
        user_companies::create_my_company,
        user_companies::get_my_company,
        user_companies::update_kyc,
        user_companies::create_campaign,
        user_companies::list_campaigns,
        user_companies::get_campaign,
        campaigns::list_campaigns,
        campaigns::create_campaign,
        campaigns::list_company_campaigns,
        campaigns::list_company_pending,
        campaigns::list_company_approved,
        campaigns::list_company_denied,
        campaigns::get_campaign,
        campaigns::approve_campaign,
        campaigns::deny_campaign,
        notifications::list_notifications,
        notifications::mark_read
    ),
    components(
        schemas(
            ApprovalStatus,
            NotificationType,
            StoredCompany,
            StoredCampaign,
            StoredNotification,
            NotificationData,
            NotificationPage,
            UserProfile,
            AuthenticatedAdmin,
            health::HealthResponse,
            health::HealthChecks,
            admin_auth::AdminLoginRequest,
            admin_auth::AdminTokenResponse,
            webauthn::AuthenticationOptionsRequest,
            webauthn::AuthenticationVerifyRequest,
            webauthn::RegistrationVerifiedResponse,
            webauthn::PasskeyLoginResponse,
            user_auth::RegisterRequest,
            user_auth::UserLoginRequest,
            user_auth::VerifyEmailRequest,
            user_auth::ResendEmailRequest,
            user_auth::UserSessionResponse,
            user_auth::MessageResponse,
            companies::CompanyPayload,
            companies::DenialRequest,
            campaigns::CampaignPayload,
            user_companies::KycUpdateRequest,
            user_companies::KycUpdateResponse,
            notifications::MarkReadResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Admin Auth", description = "Admin password login"),
        (name = "Passkeys", description = "Admin WebAuthn registration and login"),
        (name = "User Auth", description = "User registration, login and email verification"),
        (name = "Companies", description = "Admin company management and KYC review"),
        (name = "Campaigns", description = "Admin campaign management and review"),
        (name = "User Companies", description = "Companies and campaigns owned by the caller"),
        (name = "Notifications", description = "Campaign workflow notifications")
    )
)]
struct ApiDoc;
