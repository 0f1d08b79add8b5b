use actix_web::web;

use super::handlers;

/// Configures the node routes
///
/// # Arguments
///
/// * `cfg` - The service configuration
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/chain", web::get().to(handlers::get_chain))
        .route("/mine", web::get().to(handlers::mine_block))
        .route("/transactions/new", web::post().to(handlers::new_transaction))
        .route("/transactions/pending", web::get().to(handlers::get_pending_transactions))
        .route("/validate", web::get().to(handlers::validate_chain))
        .route("/balance/{address}", web::get().to(handlers::get_balance))
        .route("/nodes/register", web::post().to(handlers::register_nodes));
}
