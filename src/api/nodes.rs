use actix_web::http::Uri;
use dashmap::DashSet;
use log::info;

use super::error::ApiError;

/// Peer node addresses known to this node, kept as `host[:port]`
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: DashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry::default()
    }

    /// Registers a node given by URL and returns its normalized address
    ///
    /// `http://192.168.0.5:5000/` is stored as `192.168.0.5:5000`.
    /// Registering the same node twice keeps a single entry.
    pub fn register(&self, url: &str) -> Result<String, ApiError> {
        let node = normalize(url)?;
        if self.nodes.insert(node.clone()) {
            info!("Registered node {}", node);
        }
        Ok(node)
    }

    /// All registered nodes, sorted
    pub fn list(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nodes.iter().map(|node| node.key().clone()).collect();
        nodes.sort();
        nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn normalize(url: &str) -> Result<String, ApiError> {
    let uri: Uri = url
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidNode(url.to_string()))?;

    uri.authority()
        .map(|authority| authority.as_str().to_string())
        .ok_or_else(|| ApiError::InvalidNode(url.to_string()))
}
