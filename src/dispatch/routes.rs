use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{DefaultBodyLimit, FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use serde_json::json;

use super::dispatcher::{DispatchError, Dispatcher};
use super::request::{DispatchRequest, DocumentPart, ImagePart, ManifestEntry};
use super::traits::{AssetStore, MailRelay};
use crate::guard::{GuardState, Staff};
use crate::types::EmailAddress;

const SEND_EMAIL_PATH: &str = "/api/admin/sendemail";

// Several 2 MiB images plus documents have to fit in one form.
const MAX_FORM_BYTES: usize = 32 * 1024 * 1024;

/// Create the guarded send-email router.
///
/// Mounts `POST /api/admin/sendemail`, consuming the browser's multipart
/// form: the scalar fields (`fromName`, `fromEmail`, `to`, `subject`,
/// `closing`, `signature`, `disclaimer`), the `blocks` manifest as JSON,
/// and binary parts keyed `image_<i>` / `doc_<i>`.
pub fn dispatch_routes<A, M>(guard: GuardState, dispatcher: Dispatcher<A, M>) -> Router
where
    A: AssetStore,
    M: MailRelay,
{
    let state = DispatchState {
        guard,
        dispatcher: Arc::new(dispatcher),
    };

    Router::new()
        .route(SEND_EMAIL_PATH, post(send_email::<A, M>))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(state)
}

/// Shared state for the dispatch route handlers.
pub(super) struct DispatchState<A, M> {
    pub(super) guard: GuardState,
    pub(super) dispatcher: Arc<Dispatcher<A, M>>,
}

// Manual Clone: avoid derive adding `A: Clone, M: Clone` bounds.
impl<A, M> Clone for DispatchState<A, M> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

// The Staff extractor reaches the guard through the route state.
impl<A, M> FromRef<DispatchState<A, M>> for GuardState {
    fn from_ref(state: &DispatchState<A, M>) -> Self {
        state.guard.clone()
    }
}

#[derive(Debug, thiserror::Error)]
enum RouteError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid blocks manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Address(#[from] crate::error::Error),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Dispatch(_) => {
                tracing::error!(error = %self, "send email failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => {
                tracing::warn!(error = %self, "send email rejected");
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn send_email<A, M>(
    State(state): State<DispatchState<A, M>>,
    staff: Staff,
    multipart: Multipart,
) -> Result<Response, RouteError>
where
    A: AssetStore,
    M: MailRelay,
{
    let request = read_form(multipart).await?;

    tracing::info!(
        user = %staff.identity.username,
        to = %request.to,
        blocks = request.manifest.len(),
        "email dispatch requested"
    );

    state.dispatcher.dispatch(request).await?;

    Ok((StatusCode::OK, Json(json!({ "message": "Email sent." }))).into_response())
}

async fn read_form(mut multipart: Multipart) -> Result<DispatchRequest, RouteError> {
    let mut from_name = String::new();
    let mut from_email = None;
    let mut to = None;
    let mut subject = None;
    let mut closing = String::new();
    let mut signature = String::new();
    let mut disclaimer = String::new();
    let mut blocks_raw = None;
    let mut images = BTreeMap::new();
    let mut documents = BTreeMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "fromName" => from_name = field.text().await?,
            "fromEmail" => from_email = Some(field.text().await?),
            "to" => to = Some(field.text().await?),
            "subject" => subject = Some(field.text().await?),
            "closing" => closing = field.text().await?,
            "signature" => signature = field.text().await?,
            "disclaimer" => disclaimer = field.text().await?,
            "blocks" => blocks_raw = Some(field.text().await?),
            other => {
                if let Some(i) = indexed_part(other, "image_") {
                    let media_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let payload = field.bytes().await?.to_vec();
                    images.insert(i, ImagePart {
                        payload,
                        media_type,
                    });
                } else if let Some(i) = indexed_part(other, "doc_") {
                    let filename = field.file_name().unwrap_or("attachment").to_owned();
                    let media_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let payload = field.bytes().await?.to_vec();
                    documents.insert(i, DocumentPart {
                        filename,
                        payload,
                        media_type,
                    });
                }
                // Anything else (e.g. docCount) is ignored.
            }
        }
    }

    let from_email = from_email.ok_or(RouteError::MissingField("fromEmail"))?;
    let to = to.ok_or(RouteError::MissingField("to"))?;
    let subject = subject.ok_or(RouteError::MissingField("subject"))?;
    let blocks_raw = blocks_raw.ok_or(RouteError::MissingField("blocks"))?;

    let manifest: Vec<ManifestEntry> = serde_json::from_str(&blocks_raw)?;
    let to = EmailAddress::try_from(to)?;

    Ok(DispatchRequest {
        from_name,
        from_email,
        to,
        subject,
        closing,
        signature,
        disclaimer,
        manifest,
        images,
        documents: documents.into_values().collect(),
    })
}

/// Parse `<prefix><index>` part names (`image_2`, `doc_0`).
fn indexed_part(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.parse().ok()
}
