use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use tracing::info;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the value of the environment variable `key`, or `default` when it is unset or empty
pub fn get_env_var(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Everything the service needs to reach the database and accept requests
#[derive(Debug)]
pub struct Config {
    /// Contact points, already paired with the client port (`host:port`)
    pub nodes: Vec<String>,
    pub client_port: u16,
    pub keyspace: String,
    pub user_name: String,
    pub user_password: SecretString,
    /// HTTP listen port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional:
    /// - `DHCS_NODE_LIST`: comma-separated node hosts, optionally `host:port` (default: "localhost")
    /// - `DHCS_CLIENT_PORT`: CQL native port (default: 9042)
    /// - `KEYSPACE`: keyspace holding the `tweets` table (default: "tweetspace")
    /// - `DHCS_USER_NAME` / `DHCS_USER_PASSWORD`: credentials
    /// - `PORT`: HTTP listen port (default: 8080)
    pub fn from_env() -> anyhow::Result<Self> {
        let client_port_str = get_env_var("DHCS_CLIENT_PORT", "9042");
        let client_port = client_port_str.parse::<u16>().map_err(|e| {
            anyhow::anyhow!("DHCS_CLIENT_PORT `{client_port_str}` is not a valid port : {e}")
        })?;

        let nodes = parse_node_list(&get_env_var("DHCS_NODE_LIST", "localhost"), client_port);
        if nodes.is_empty() {
            anyhow::bail!("DHCS_NODE_LIST does not contain any node");
        }

        let port_str = get_env_var("PORT", "8080");
        let port = port_str
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT `{port_str}` is not a valid port : {e}"))?;

        let config = Self {
            nodes,
            client_port,
            keyspace: get_env_var("KEYSPACE", "tweetspace"),
            user_name: get_env_var("DHCS_USER_NAME", "kehsihba"),
            user_password: SecretString::from(get_env_var("DHCS_USER_PASSWORD", "s3cr3t")),
            port,
        };

        info!(
            nodes = ?config.nodes,
            client_port = config.client_port,
            keyspace = %config.keyspace,
            user = %config.user_name,
            port = config.port,
            "configuration loaded"
        );

        Ok(config)
    }
}

fn parse_node_list(node_list: &str, client_port: u16) -> Vec<String> {
    node_list
        .split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .map(|node| contact_point(node, client_port))
        .collect()
}

/// `host:port` for one node list entry. An entry that already carries a port keeps it, a bare IPv6
/// address is bracketed.
fn contact_point(node: &str, client_port: u16) -> String {
    if node.parse::<SocketAddr>().is_ok() {
        return node.to_string();
    }
    if let Ok(IpAddr::V6(ip)) = node.parse::<IpAddr>() {
        return SocketAddr::from((ip, client_port)).to_string();
    }
    if node.starts_with('[') && node.ends_with(']') {
        return format!("{node}:{client_port}");
    }
    match node.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.parse::<u16>().is_ok() => {
            node.to_string()
        }
        _ => format!("{node}:{client_port}"),
    }
}
