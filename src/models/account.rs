use serde::{Deserialize, Serialize};

/// Account state as reported by the node.
///
/// # Example (JSON representation)
///
/// ```json
/// { "identifier": "9f0a...", "nonce": 4, "balance": "250000" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier, hex-encoded
    #[serde(default)]
    pub identifier: Option<String>,

    /// Last used nonce; absent for accounts the node has never seen.
    /// The build pipeline treats absence as fatal rather than assuming 0.
    #[serde(default)]
    pub nonce: Option<u64>,

    /// Spendable balance as a decimal string
    #[serde(default)]
    pub balance: Option<String>,
}
