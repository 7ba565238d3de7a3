use crate::cli::Args;
use crate::server::relay::{ parse_prompt, RelayService };
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::Bytes,
    routing::post,
    Router,
    extract::State,
    response::{ IntoResponse, Response },
};
use tower_http::cors::{ Any, CorsLayer };
use uuid::Uuid;
use log::{ info, warn, error };

#[derive(Clone)]
struct AppState {
    relay: RelayService,
}

/// `POST /generate` with permissive CORS.
pub fn router(relay: RelayService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(generate_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    relay: RelayService,
    args: Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.server_addr().parse::<SocketAddr>()?;
    let app = router(relay);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("TLS enabled without cert/key".into());
            }
        };
        info!(
            "TLS enabled. Loading certificate from '{}' and key from '{}'",
            cert_path,
            key_path
        );
        let _ = rustls::crypto::ring::default_provider().install_default();
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Server running on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;
        info!("Server running on http://{}", listener.local_addr()?);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();

    let prompt = match parse_prompt(&body) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("[{}] Rejected request: {}", request_id, e);
            return e.into_response();
        }
    };

    info!("[{}] Generating with model={} prompt_len={}", request_id, state.relay.model(), prompt.len());
    match state.relay.generate(&prompt).await {
        Ok(text) => {
            info!("[{}] Generated {} bytes", request_id, text.len());
            text.into_response()
        }
        Err(e) => {
            error!("[{}] Generation failed: {}", request_id, e);
            e.into_response()
        }
    }
}
