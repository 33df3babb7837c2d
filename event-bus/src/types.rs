//! Type definitions for event bus

use serde::{Deserialize, Serialize};

/// Message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Expense recorded by the expense service
    ExpenseRecorded,
    /// Transfer recorded, updated, or deleted by the settlement service
    TransferRecorded,
    /// Settlement plan computed
    SettlementComputed,
    /// System event
    SystemEvent,
}

impl MessageType {
    /// Get NATS subject prefix for this message type
    pub fn subject_prefix(&self) -> &'static str {
        match self {
            MessageType::ExpenseRecorded => "settleup.expense.recorded",
            MessageType::TransferRecorded => "settleup.transfer.recorded",
            MessageType::SettlementComputed => "settleup.settlement.computed",
            MessageType::SystemEvent => "settleup.system.event",
        }
    }

    /// Get JetStream stream name for this message type
    pub fn stream_name(&self) -> &'static str {
        match self {
            MessageType::ExpenseRecorded => "EXPENSE_EVENTS",
            MessageType::TransferRecorded => "TRANSFER_EVENTS",
            MessageType::SettlementComputed => "SETTLEMENT_EVENTS",
            MessageType::SystemEvent => "SYSTEM_EVENTS",
        }
    }
}

/// Partition key for routing messages
///
/// Events for one group must land on one partition so a single consumer sees
/// them; events for different groups carry no ordering relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionKey {
    /// Partition by group ID
    Group(i64),
    /// Broadcast to all partitions
    Broadcast,
}

impl PartitionKey {
    /// Get partitioning string for NATS subject
    pub fn to_subject_segment(&self) -> String {
        match self {
            PartitionKey::Group(id) => format!("group.{}", id),
            PartitionKey::Broadcast => "broadcast".to_string(),
        }
    }

    /// Compute partition number for load balancing
    pub fn partition_number(&self, num_partitions: u32) -> u32 {
        let hash = match self {
            PartitionKey::Group(id) => blake3::hash(&id.to_le_bytes()),
            PartitionKey::Broadcast => return 0, // Broadcast goes to partition 0
        };

        let hash_bytes = hash.as_bytes();
        let hash_u32 =
            u32::from_le_bytes([hash_bytes[0], hash_bytes[1], hash_bytes[2], hash_bytes[3]]);
        hash_u32 % num_partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_prefixes() {
        assert_eq!(
            MessageType::ExpenseRecorded.subject_prefix(),
            "settleup.expense.recorded"
        );
        assert_eq!(MessageType::ExpenseRecorded.stream_name(), "EXPENSE_EVENTS");
    }

    #[test]
    fn test_partition_key_subject() {
        let key = PartitionKey::Group(42);
        assert_eq!(key.to_subject_segment(), "group.42");

        assert_eq!(PartitionKey::Broadcast.to_subject_segment(), "broadcast");
    }

    #[test]
    fn test_partition_number() {
        let key = PartitionKey::Group(7);
        let partition = key.partition_number(32);
        assert!(partition < 32);

        // Same key should always hash to same partition
        let partition2 = key.partition_number(32);
        assert_eq!(partition, partition2);
    }

    #[test]
    fn test_broadcast_partition_is_zero() {
        assert_eq!(PartitionKey::Broadcast.partition_number(32), 0);
    }
}
