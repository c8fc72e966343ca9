use crate::error::{BlockchainError, Result};
use log::{debug, info};
use std::net::SocketAddr;
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Parses a plain-text peer list, one `ip:port` per line. Blank lines and
/// `#` comments are skipped, unparsable lines are ignored.
pub fn parse_peer_list(text: &str) -> Vec<SocketAddr> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse() {
            Ok(addr) => Some(addr),
            Err(_) => {
                debug!("Skipping bad peer list entry {line:?}");
                None
            }
        })
        .collect()
}

pub async fn download_peer_list(url: &str) -> Result<Vec<SocketAddr>> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| BlockchainError::Network(format!("http client: {e}")))?;
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| BlockchainError::Network(format!("peer list download failed: {e}")))?;
    let body = response
        .text()
        .await
        .map_err(|e| BlockchainError::Network(format!("peer list download failed: {e}")))?;
    let peers = parse_peer_list(&body);
    info!("Downloaded {} peers from {url}", peers.len());
    Ok(peers)
}
