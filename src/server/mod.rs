use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use backend::ChatAppBackend;
use messenger::QueuedMessenger;
use verifier::RequestVerifier;

use crate::auth::InMemoryCredentialStore;
use crate::config::AppConfig;
use crate::reply::Reply;

pub mod backend;
pub mod messenger;
pub mod verifier;

pub const LANDING_TEXT: &str = "Sorry, this endpoint must be called from Google Chat.";

pub struct ChatAppServer {
    backend: &'static ChatAppBackend,
    bind: SocketAddr,
}

impl ChatAppServer {
    /// Builds the backend and starts the outbound delivery task.
    /// Must be called inside the tokio runtime.
    pub async fn new(config: &AppConfig) -> anyhow::Result<&'static Self> {
        let bind = config.bind_addr()?;
        let verifier = match &config.auth.audience {
            Some(audience) => {
                Some(RequestVerifier::fetch(audience, &config.auth.verification_keys_url).await?)
            }
            None => {
                warn!("[Server]No auth.audience configured, requests are not verified");
                None
            }
        };
        let (messenger, outbound) = QueuedMessenger::new(config.outbound_queue_capacity);
        tokio::spawn(messenger::delivery_loop(outbound));
        let backend = ChatAppBackend::new(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(messenger),
            verifier,
        );
        let server = ChatAppServer { backend, bind };
        Ok(Box::leak(Box::new(server)))
    }

    pub fn router(backend: &'static ChatAppBackend) -> Router {
        Router::new()
            .route("/", get(ChatAppServer::landing).post(ChatAppServer::on_event))
            .with_state(backend)
    }

    pub async fn run(&'static self) -> anyhow::Result<()> {
        info!("[Server]Starting chat app service...");
        let app = Self::router(self.backend);
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("[Server]Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("[Server]Stopped");
        Ok(())
    }

    async fn on_event(
        State(backend): State<&'static ChatAppBackend>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Json<Reply> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("event", %request_id);
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let reply = span.in_scope(|| backend.handle_event(authorization, &body));
        Json(reply)
    }

    async fn landing() -> &'static str {
        LANDING_TEXT
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "[Server]Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("[Server]Shutdown signal received");
}
