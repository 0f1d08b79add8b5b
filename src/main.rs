use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pow_ledger::api::{self, schema, AppState};
use pow_ledger::blockchain::{Block, Ledger, Transaction};
use pow_ledger::config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::validate_chain,
        api::handlers::get_balance,
        api::handlers::register_nodes
    ),
    components(
        schemas(
            Block,
            Transaction,
            schema::ChainResponse,
            schema::TransactionRequest,
            schema::TransactionResponse,
            schema::MineResponse,
            schema::ValidationResponse,
            schema::BalanceResponse,
            schema::RegisterNodesRequest,
            schema::RegisterNodesResponse
        )
    ),
    tags(
        (name = "ledger", description = "Proof-of-work ledger node endpoints")
    ),
    info(
        title = "Ledger Node API",
        version = "0.1.0",
        description = "A proof-of-work balance ledger",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

// Create the node state with a fresh identifier and a genesis block crediting it
fn initialize_node(config: &Config) -> anyhow::Result<AppState> {
    let ledger = match config.max_pending {
        Some(capacity) => Ledger::with_pending_capacity(capacity),
        None => Ledger::new(),
    };

    let node_id = api::generate_node_id();
    info!("Node identifier: {}", node_id);

    AppState::with_genesis(ledger, node_id, config.mining_timeout())
        .context("Failed to create the genesis block")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::parse();
    let state = web::Data::new(initialize_node(&config)?);

    let (host, port) = config.bind_address();
    info!("Starting HTTP server at http://{}:{}", host, port);

    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(api::configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await
    .context("HTTP server failed")
}
