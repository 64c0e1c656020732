/// tidal-demo - example programs for the Tidal API client
///
/// Catalog lookups authenticate with the client-credentials grant; `login`
/// walks through the authorization-code-with-PKCE flow using a local
/// callback server.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tidal_client::{ClientConfig, Credential, GetOptions, PkceAuthorization, TidalClient};
use tokio::sync::{oneshot, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod store;

use store::PendingAuthStore;

/// Abandoned logins are forgotten after this long.
const PENDING_AUTH_TTL: Duration = Duration::from_secs(600);

#[derive(Parser)]
#[command(name = "tidal-demo")]
#[command(about = "Tidal API client examples", long_about = None)]
struct Cli {
    /// OAuth2 client id
    #[arg(long, env = "TIDAL_CLIENT_ID")]
    client_id: String,

    /// OAuth2 client secret (catalog lookups only)
    #[arg(long, env = "TIDAL_CLIENT_SECRET")]
    client_secret: Option<String>,

    /// Country code sent with catalog lookups
    #[arg(long, default_value = "US")]
    country: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an artist by id
    Artist { id: String },
    /// Fetch an album by id
    Album { id: String },
    /// Fetch a track by id
    Track { id: String },
    /// List a user's favorite artists
    Favorites {
        user_id: String,
        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Run the authorization-code-with-PKCE login flow
    Login {
        /// Port for the local callback server
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidal_demo=info,tidal_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Artist { ref id } => {
            let client = catalog_client(&cli)?;
            let artist = client.artists().get(id, &lookup_options(&cli)).await?;
            print_json(&artist)?;
        }
        Commands::Album { ref id } => {
            let client = catalog_client(&cli)?;
            let album = client.albums().get(id, &lookup_options(&cli)).await?;
            print_json(&album)?;
        }
        Commands::Track { ref id } => {
            let client = catalog_client(&cli)?;
            let track = client.tracks().get(id, &lookup_options(&cli)).await?;
            print_json(&track)?;
        }
        Commands::Favorites { ref user_id, limit } => {
            let client = catalog_client(&cli)?;
            let options = lookup_options(&cli).limit(limit);
            let artists = client.users().favorite_artists(user_id, &options).await?;
            print_json(&artists)?;
        }
        Commands::Login { port } => {
            login(&cli, port).await?;
        }
    }

    Ok(())
}

fn catalog_client(cli: &Cli) -> anyhow::Result<TidalClient> {
    let secret = cli
        .client_secret
        .clone()
        .ok_or_else(|| anyhow!("TIDAL_CLIENT_SECRET is required for catalog lookups"))?;

    let config = ClientConfig::new(cli.client_id.clone()).with_client_secret(secret);
    TidalClient::client_credentials(config).context("failed to build client")
}

fn lookup_options(cli: &Cli) -> GetOptions {
    GetOptions::new().country_code(cli.country.clone())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shared state of the callback server.
struct AppState {
    store: PendingAuthStore,
    completed: Mutex<Option<oneshot::Sender<Credential>>>,
}

/// Query parameters the identity provider redirects back with.
#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn login(cli: &Cli, port: u16) -> anyhow::Result<()> {
    let config = ClientConfig::new(cli.client_id.clone())
        .with_redirect_uri(format!("http://127.0.0.1:{}/callback", port));

    let pkce = PkceAuthorization::new(&config)?;
    let state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let authorize_url = pkce.authorize_url(&state);

    let (completed_tx, completed_rx) = oneshot::channel();
    let app_state = Arc::new(AppState {
        store: PendingAuthStore::new(PENDING_AUTH_TTL),
        completed: Mutex::new(Some(completed_tx)),
    });
    app_state.store.insert(state, pkce).await;

    let router = Router::new()
        .route("/callback", get(callback))
        .with_state(Arc::clone(&app_state));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind callback server on {}", addr))?;

    tracing::info!(%addr, "Callback server listening");
    println!("Open this URL in your browser to authorize:\n\n{}\n", authorize_url);

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    let credential = tokio::time::timeout(PENDING_AUTH_TTL, completed_rx)
        .await
        .map_err(|_| anyhow!("authentication timed out"))?
        .map_err(|_| anyhow!("callback server stopped before completing"))?;

    server.abort();

    println!("Authentication successful!");
    println!("  token type:  {}", credential.token_type);
    println!("  expires at:  {}", credential.expires_at.to_rfc3339());
    if let Some(scope) = &credential.scope {
        println!("  scope:       {}", scope);
    }
    println!(
        "  refresh:     {}",
        if credential.refresh_token.is_some() {
            "yes"
        } else {
            "no"
        }
    );

    // The credential is ready to back an authenticated client.
    let _client = TidalClient::with_credential(config, credential)?;

    Ok(())
}

async fn callback(
    State(app): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, String) {
    if let Some(error) = params.error {
        return (
            StatusCode::BAD_REQUEST,
            format!("Authorization was denied: {}", error),
        );
    }

    let (Some(code), Some(state)) = (params.code, params.state) else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing code or state parameter".to_string(),
        );
    };

    let Some(pkce) = app.store.take(&state).await else {
        return (
            StatusCode::BAD_REQUEST,
            "Unknown or expired authorization state".to_string(),
        );
    };

    match pkce.exchange(&code).await {
        Ok(credential) => {
            if let Some(tx) = app.completed.lock().await.take() {
                let _ = tx.send(credential);
            }
            (
                StatusCode::OK,
                "Authentication complete. You can close this tab.".to_string(),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Code exchange failed");
            (
                StatusCode::BAD_GATEWAY,
                format!("Code exchange failed: {}", e),
            )
        }
    }
}
