//! Block and transaction types consumed by the analysis engine.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// A single transaction, as seen by the analyzer after decoding and sender recovery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The transaction hash.
    #[serde(default)]
    pub hash: B256,

    /// The recovered sender of the transaction.
    pub from: Address,

    /// The recipient. `None` for contract creation.
    #[serde(default)]
    pub to: Option<Address>,

    /// Calldata for message calls, init code for contract creation.
    #[serde(default)]
    pub input: Bytes,

    /// The value transferred with the transaction.
    #[serde(default)]
    pub value: U256,

    /// The effective gas price paid by the transaction.
    #[serde(default)]
    pub gas_price: U256,
}

impl Transaction {
    /// Whether this transaction deploys a new contract.
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// A block and its ordered list of transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// The block number.
    pub number: u64,

    /// The block hash.
    #[serde(default)]
    pub hash: B256,

    /// The beneficiary of the block.
    #[serde(default)]
    pub coinbase: Address,

    /// The block timestamp, in seconds.
    #[serde(default)]
    pub timestamp: u64,

    /// The block gas limit.
    #[serde(default)]
    pub gas_limit: u64,

    /// The block difficulty, or prevrandao after the merge.
    #[serde(default)]
    pub difficulty: U256,

    /// The block base fee.
    #[serde(default)]
    pub base_fee: U256,

    /// The chain id the block belongs to.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// The transactions included in the block, in execution order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

fn default_chain_id() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_deserializes_with_defaults() {
        let block: Block = serde_json::from_str(
            r#"{
                "number": 7,
                "transactions": [
                    { "from": "0x0000000000000000000000000000000000000001" }
                ]
            }"#,
        )
        .expect("failed to parse block");

        assert_eq!(block.number, 7);
        assert_eq!(block.chain_id, 1);
        assert_eq!(block.transactions.len(), 1);
        assert!(block.transactions[0].is_create());
        assert!(block.transactions[0].input.is_empty());
    }
}
