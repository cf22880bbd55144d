// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{AddressResponse, CreateWalletResponse, DeriveAddressRequest, GeneratedWalletResponse},
    state::{GeneratorState, RegistryState},
};

pub mod generator;
pub mod health;
pub mod users;

/// Routes of the stateless generator role.
pub fn generator_router(state: GeneratorState) -> Router {
    let routes = Router::new()
        .route(
            "/wallet",
            post(generator::generate_wallet).get(generator::address_from_mnemonic),
        )
        .route("/wallet/address", post(generator::address_from_seed))
        .with_state(state);

    with_common_layers(routes, GeneratorApiDoc::openapi())
}

/// Routes of the per-user registry role.
pub fn registry_router(state: RegistryState) -> Router {
    let routes = Router::new()
        .route(
            "/users/wallet",
            post(users::create_wallet).get(users::get_address),
        )
        .route("/users/wallet/address", get(users::get_address))
        .with_state(state);

    with_common_layers(routes, RegistryApiDoc::openapi())
}

fn with_common_layers(routes: Router, doc: utoipa::openapi::OpenApi) -> Router {
    routes
        .route("/health", get(health::health))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", doc))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Span with method and path only. Query strings can carry key material
/// (`GET /wallet?seed=`) and must never reach the logs.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[derive(OpenApi)]
#[openapi(
    paths(
        generator::generate_wallet,
        generator::address_from_mnemonic,
        generator::address_from_seed,
        health::health
    ),
    components(schemas(
        GeneratedWalletResponse,
        AddressResponse,
        DeriveAddressRequest,
        health::HealthResponse
    )),
    tags(
        (name = "Generator", description = "Stateless wallet generation and address derivation"),
        (name = "Health", description = "Liveness")
    )
)]
struct GeneratorApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(users::create_wallet, users::get_address, health::health),
    components(schemas(CreateWalletResponse, health::HealthResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "Users", description = "Per-user wallet provisioning"),
        (name = "Health", description = "Liveness")
    )
)]
struct RegistryApiDoc;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use tower::ServiceExt;

    use super::*;
    use crate::provisioning::KeyMaterialGenerator;

    fn generator_app() -> Router {
        generator_router(GeneratorState::new(KeyMaterialGenerator::with_os_entropy("")))
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success(), "{uri}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_on_both_roles() {
        let body = get_json(generator_app(), "/health").await;
        assert_eq!(body["status"], "ok");

        let body = get_json(registry_router(RegistryState::for_tests()), "/health").await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_documents_role_routes() {
        let doc = get_json(generator_app(), "/api-doc/openapi.json").await;
        assert!(doc["paths"]["/wallet"].is_object());
        assert!(doc["paths"]["/wallet/address"].is_object());
        assert!(doc["paths"]["/users/wallet"].is_null());

        let registry_app = registry_router(RegistryState::for_tests());
        let doc = get_json(registry_app, "/api-doc/openapi.json").await;
        assert!(doc["paths"]["/users/wallet"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = generator_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
