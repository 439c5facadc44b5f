//! Purchased items.

use serde::{Deserialize, Serialize};

use crate::{InventoryEntryId, UserId};

/// One purchased unit of a catalog item.
///
/// A user's count for an item is the number of entries carrying that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Store-assigned identifier.
    pub id: InventoryEntryId,
    /// Owning account.
    pub owner_id: UserId,
    /// Catalog item name.
    pub item: String,
}
