use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;

use crate::blob::BlobStore;
use crate::db::PortalStorage;
use crate::handlers::labeling::{label_image_handler, next_image_handler, serve_image_handler};
use crate::handlers::portal::{
    dashboard_handler, login_form_handler, login_submit_handler, logout_handler,
};
use crate::handlers::upload::upload_handler;

/// Per-request shared state: the two stores, the device secret, and the
/// session cookie key. Constructed once in `main` and cloned into handlers.
#[derive(Clone)]
pub struct SnowgateState {
    pub records: PortalStorage,
    pub blobs: BlobStore,
    pub device_api_key: Arc<str>,
    cookie_key: Key,
}

impl SnowgateState {
    pub fn new(
        records: PortalStorage,
        blobs: BlobStore,
        device_api_key: Arc<str>,
        cookie_key: Key,
    ) -> Self {
        Self {
            records,
            blobs,
            device_api_key,
            cookie_key,
        }
    }
}

impl FromRef<SnowgateState> for Key {
    fn from_ref(state: &SnowgateState) -> Key {
        state.cookie_key.clone()
    }
}

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn snowgate_router(state: SnowgateState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/login", get(login_form_handler).post(login_submit_handler))
        .route("/logout", get(logout_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/next-image", get(next_image_handler))
        .route("/api/label-image/{image_id}", post(label_image_handler))
        .route("/uploads/{filename}", get(serve_image_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
