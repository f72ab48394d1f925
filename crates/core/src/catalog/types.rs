//! Status catalog domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::error::CatalogError;

/// Terminal subtype of an end-state status.
///
/// A status carrying one of these marks the order as finished in some
/// sense; each subtype drives different payment-consistency rules when
/// an order transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndState {
    /// Work completed; the order must end up fully paid.
    Done,
    /// Order cancelled; the order must end up with zero payment.
    Cancelled,
    /// Order parked; payment is cleared and a resume date recorded.
    Pending,
}

impl EndState {
    /// Returns the string representation of the end-state subtype.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }

    /// Parses an end-state subtype from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Builds the optional end state from untyped boundary input.
    ///
    /// A definition flagged as an end state must name a subtype; a
    /// definition that is not an end state ignores any subtype given.
    pub fn from_flags(
        is_end_state: bool,
        end_state_type: Option<&str>,
    ) -> Result<Option<Self>, CatalogError> {
        if !is_end_state {
            return Ok(None);
        }
        match end_state_type {
            None => Err(CatalogError::MissingEndStateType),
            Some(s) if s.trim().is_empty() => Err(CatalogError::MissingEndStateType),
            Some(s) => Self::parse(s)
                .map(Some)
                .ok_or_else(|| CatalogError::InvalidEndStateType(s.to_string())),
        }
    }
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named order status in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    /// Unique identifier for the definition.
    pub id: Uuid,
    /// Display name shown in the UI.
    pub label: String,
    /// Stable machine key, unique across the catalog.
    pub value: String,
    /// Display color (hex or CSS color name).
    pub color: String,
    /// Optional description of what the status means.
    pub description: Option<String>,
    /// Terminal subtype; `None` for ordinary workflow statuses.
    pub end_state: Option<EndState>,
    /// Whether new orders start in this status (at most one per catalog).
    pub is_default: bool,
    /// Display/priority position, unique per catalog, densely assigned.
    pub sort_order: i32,
}

impl StatusDefinition {
    /// Returns true if this status marks an order as terminal.
    #[must_use]
    pub fn is_end_state(&self) -> bool {
        self.end_state.is_some()
    }
}

/// An immutable snapshot of the status catalog.
///
/// Always dependency-injected into the rules that need it; holders must
/// re-read it inside the same transaction that writes any decision based
/// on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCatalog {
    definitions: Vec<StatusDefinition>,
}

impl StatusCatalog {
    /// Creates a catalog snapshot, ordered by `sort_order`.
    #[must_use]
    pub fn new(mut definitions: Vec<StatusDefinition>) -> Self {
        definitions.sort_by_key(|d| d.sort_order);
        Self { definitions }
    }

    /// Returns the definitions in display order.
    #[must_use]
    pub fn definitions(&self) -> &[StatusDefinition] {
        &self.definitions
    }

    /// Looks up a definition by its stable machine key.
    #[must_use]
    pub fn find_by_value(&self, value: &str) -> Option<&StatusDefinition> {
        self.definitions.iter().find(|d| d.value == value)
    }

    /// Looks up a definition by id.
    #[must_use]
    pub fn find_by_id(&self, id: Uuid) -> Option<&StatusDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Returns the default status for new orders, if one is set.
    #[must_use]
    pub fn default_status(&self) -> Option<&StatusDefinition> {
        self.definitions.iter().find(|d| d.is_default)
    }

    /// Returns the highest sort order in the catalog, or 0 when empty.
    #[must_use]
    pub fn max_sort_order(&self) -> i32 {
        self.definitions
            .iter()
            .map(|d| d.sort_order)
            .max()
            .unwrap_or(0)
    }

    /// Returns the number of definitions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
