use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{pow, Address, Block, Transaction};

use super::error::ApiError;
use super::schema::{
    BalanceResponse, ChainResponse, MineResponse, RegisterNodesRequest, RegisterNodesResponse,
    TransactionRequest, TransactionResponse, ValidationResponse,
};
use super::state::AppState;

/// Data structure for the node state
pub type NodeData = web::Data<AppState>;

/// Get the full blockchain
///
/// Returns every committed block and the chain length
#[utoipa::path(
    get,
    path = "/chain",
    responses(
        (status = 200, description = "Blockchain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(state: NodeData) -> HttpResponse {
    let chain = state.ledger.read().chain().to_vec();

    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(state: NodeData) -> HttpResponse {
    let pending = state.ledger.read().current_transactions().to_vec();
    HttpResponse::Ok().json(pending)
}

/// Create a new transaction
///
/// Admits a transfer into the pending pool if the sender can afford it
#[utoipa::path(
    post,
    path = "/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted", body = TransactionResponse),
        (status = 400, description = "Malformed or unaffordable transaction")
    )
)]
pub async fn new_transaction(
    state: NodeData,
    request: web::Json<TransactionRequest>,
) -> Result<HttpResponse, ApiError> {
    let transaction = request.into_inner().into_transaction()?;

    let index = state
        .ledger
        .write()
        .append_transaction(transaction)
        .map_err(|err| {
            warn!("Rejected transaction: {}", err);
            err
        })?;

    Ok(HttpResponse::Created().json(TransactionResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    }))
}

/// Mine a new block
///
/// Searches a proof of work, then mints the pending pool into a block
/// rewarding this node
#[utoipa::path(
    get,
    path = "/mine",
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse),
        (status = 409, description = "The chain advanced during the search"),
        (status = 503, description = "No proof found before the mining timeout")
    )
)]
pub async fn mine_block(state: NodeData) -> Result<HttpResponse, ApiError> {
    let (last_proof, last_hash, last_timestamp) = {
        let ledger = state.ledger.read();
        let last = ledger.last_block().ok_or(ApiError::EmptyChain)?;
        (last.proof, last.hash(), last.timestamp)
    };

    let proof = search_proof(last_proof, state.mining_timeout).await?;

    let block = {
        let mut ledger = state.ledger.write();
        if ledger.last_block().map(Block::hash) != Some(last_hash) {
            return Err(ApiError::StaleProof);
        }
        // blocks minted within the same millisecond would not validate
        let timestamp = Utc::now().timestamp_millis().max(last_timestamp + 1);
        ledger
            .create_block(proof, state.node_id.clone(), Some(last_hash), Some(timestamp))?
            .clone()
    };

    info!("Forged block {} with proof {}", block.index, block.proof);
    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged".to_string(),
        block,
    }))
}

/// Check if the blockchain is valid
///
/// Runs the full chain validation on the node's chain
#[utoipa::path(
    get,
    path = "/validate",
    responses(
        (status = 200, description = "Blockchain validation status", body = ValidationResponse)
    )
)]
pub async fn validate_chain(state: NodeData) -> HttpResponse {
    let ledger = state.ledger.read();
    HttpResponse::Ok().json(ValidationResponse {
        valid: ledger.is_valid(),
        length: ledger.chain().len(),
    })
}

/// Get the balance of an address
///
/// Counts committed and pending transactions alike
#[utoipa::path(
    get,
    path = "/balance/{address}",
    params(
        ("address" = String, Path, description = "Hex encoded address")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn get_balance(
    state: NodeData,
    address: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let address = Address::from_hex(&address.into_inner())?;
    let balance = state.ledger.read().balance_of(&address);

    Ok(HttpResponse::Ok().json(BalanceResponse {
        address: address.to_hex(),
        balance: balance.to_string(),
    }))
}

/// Register peer nodes
///
/// Records each node URL as its host and port
#[utoipa::path(
    post,
    path = "/nodes/register",
    request_body = RegisterNodesRequest,
    responses(
        (status = 201, description = "Nodes registered", body = RegisterNodesResponse),
        (status = 400, description = "Missing or invalid node list")
    )
)]
pub async fn register_nodes(
    state: NodeData,
    request: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, ApiError> {
    let nodes = request.into_inner().nodes.ok_or(ApiError::MissingNodes)?;

    for node in &nodes {
        state.nodes.register(node)?;
    }

    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes: state.nodes.list(),
    }))
}

/// Sets the shared flag when dropped, stopping a proof search in flight
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Runs the proof search on the blocking pool, giving up after `timeout`
///
/// The search is also stopped when the request future is dropped.
async fn search_proof(last_proof: u64, timeout: Duration) -> Result<u64, ApiError> {
    let cancel = CancelOnDrop(Arc::new(AtomicBool::new(false)));
    let flag = Arc::clone(&cancel.0);
    let search = web::block(move || pow::proof_of_work_cancellable(last_proof, &flag));

    match tokio::time::timeout(timeout, search).await {
        Ok(Ok(Some(proof))) => Ok(proof),
        Ok(Ok(None)) | Err(_) => {
            warn!("Gave up searching a proof on {} after {:?}", last_proof, timeout);
            Err(ApiError::MiningTimeout(timeout))
        }
        Ok(Err(err)) => Err(ApiError::Internal(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::configure_routes;
    use crate::blockchain::{Amount, Ledger};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    const RECIPIENT: &str = "33ee49f83681417e82660cb9585d13b1";

    fn node_state() -> NodeData {
        let node_id = Address::from_hex("5ca60de0575441718094ea0ffcb02aa4").unwrap();
        web::Data::new(
            AppState::with_genesis(Ledger::new(), node_id, Duration::from_secs(30)).unwrap(),
        )
    }

    macro_rules! node_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure_routes))
                .await
        };
    }

    #[actix_web::test]
    async fn test_get_chain() {
        let state = node_state();
        let app = node_app!(state);

        let req = test::TestRequest::get().uri("/chain").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["length"], 1);
        assert_eq!(body["chain"][0]["index"], 1);
        assert_eq!(body["chain"][0]["previous_hash"], "0".repeat(64));
        assert_eq!(
            body["chain"][0]["transactions"][0]["sender"],
            "00000000000000000000000000000000"
        );
    }

    #[actix_web::test]
    async fn test_new_transaction() {
        let state = node_state();
        let app = node_app!(state);

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({
                "sender": state.node_id.to_hex(),
                "recipient": RECIPIENT,
                "amount": "0.5",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Transaction will be added to Block 2");
        assert_eq!(body["index"], 2);

        let req = test::TestRequest::get().uri("/transactions/pending").to_request();
        let pending: Vec<Transaction> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount.to_string(), "0.5");
    }

    #[actix_web::test]
    async fn test_new_transaction_rejects_overspending() {
        let state = node_state();
        let app = node_app!(state);

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({
                "sender": state.node_id.to_hex(),
                "recipient": RECIPIENT,
                "amount": 2,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("does not have sufficient balance: 2 (have 1)"));
        assert!(state.ledger.read().current_transactions().is_empty());
    }

    #[actix_web::test]
    async fn test_new_transaction_rejects_malformed_input() {
        let state = node_state();
        let app = node_app!(state);

        for body in [
            json!({"sender": "zz", "recipient": RECIPIENT, "amount": "1"}),
            json!({"sender": RECIPIENT, "recipient": RECIPIENT, "amount": "lots"}),
            json!({"sender": RECIPIENT, "amount": "1"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/transactions/new")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_mine_block() {
        let state = node_state();
        let app = node_app!(state);

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(json!({
                "sender": state.node_id.to_hex(),
                "recipient": RECIPIENT,
                "amount": "0.25",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "New Block Forged");
        assert_eq!(body["index"], 2);
        assert_eq!(body["proof"], 72608);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 2);

        let ledger = state.ledger.read();
        assert!(ledger.current_transactions().is_empty());
        assert_eq!(ledger.balance_of(&state.node_id), "1.75".parse::<Amount>().unwrap());
        drop(ledger);

        let req = test::TestRequest::get().uri("/validate").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"valid": true, "length": 2}));
    }

    #[actix_web::test]
    async fn test_get_balance() {
        let state = node_state();
        let app = node_app!(state);

        let uri = format!("/balance/{}", state.node_id.to_hex());
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], "1");

        let req = test::TestRequest::get().uri("/balance/not-hex").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_register_nodes() {
        let state = node_state();
        let app = node_app!(state);

        let req = test::TestRequest::post()
            .uri("/nodes/register")
            .set_json(json!({"nodes": ["http://192.168.0.5:5000", "http://192.168.0.6:5000/"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "New nodes have been added");
        assert_eq!(
            body["total_nodes"],
            json!(["192.168.0.5:5000", "192.168.0.6:5000"])
        );

        let req = test::TestRequest::post()
            .uri("/nodes/register")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_search_proof() {
        let proof = search_proof(1234, Duration::from_secs(30)).await.unwrap();
        assert_eq!(proof, 62594);
    }
}
