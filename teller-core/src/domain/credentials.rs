//! Credential hashing parameters

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters (the argon2 crate's recommended defaults)
pub const DEFAULT_MEMORY_COST_KIB: u32 = 19_456; // 19 MiB
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id cost parameters used when hashing new passwords
///
/// Verification reads the parameters embedded in each stored hash, so changing
/// these only affects hashes created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HashParams {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_cost_kib: DEFAULT_MEMORY_COST_KIB,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HashParams {
    /// Cheapest parameters Argon2 accepts; for tests only
    pub fn minimal() -> Self {
        Self {
            memory_cost_kib: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }
}
