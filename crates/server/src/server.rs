use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{balance, entries, reports};
use ledger::Ledger;

static ACCOUNT_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-account-id");

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
}

/// The resolved owner of the current request.
///
/// Inserted by the [`resolve_owner`] middleware; handlers take it as an
/// `Extension`. The value is opaque to this layer.
#[derive(Clone, Debug)]
pub struct Owner(pub String);

/// `TypedHeader` for the owner identity header.
///
/// Requests must carry an `x-account-id` entry whose value is the opaque,
/// already-verified owner id. Verifying it is the deployment's concern
/// (reverse proxy, gateway); this service performs no credential checks.
#[derive(Debug)]
struct AccountHeader(String);

impl Header for AccountHeader {
    fn name() -> &'static axum::http::HeaderName {
        &ACCOUNT_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(AccountHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-account-id header"),
        }
    }
}

async fn resolve_owner(
    account_header: Option<TypedHeader<AccountHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(AccountHeader(owner))) = account_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(Owner(owner));
    Ok(next.run(request).await)
}

/// Builds the application router around a ledger.
///
/// Exposed so integration tests can drive the router directly.
pub fn app(ledger: Ledger) -> Router {
    let state = ServerState {
        ledger: Arc::new(ledger),
    };

    Router::new()
        .route("/entries", get(entries::daily).post(entries::create))
        .route(
            "/entries/{id}",
            axum::routing::patch(entries::update).delete(entries::remove),
        )
        .route("/balance", get(balance::get).put(balance::adjust))
        .route("/reports/monthly", get(reports::monthly))
        .route_layer(middleware::from_fn(resolve_owner))
        .with_state(state)
}

pub async fn run(ledger: Ledger) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(ledger)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
