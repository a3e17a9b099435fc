//! Logic-layer entities for the JSON object resource

/// Input to a create call; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJsonObject {
    /// Opaque JSON payload, stored verbatim
    pub object: String,
    /// External correlation id, unique across all live objects
    pub sf_object_id: String,
    pub schema_id: String,
    /// Owning end user
    pub user_id: String,
}

/// Canonical business entity for a stored JSON object.
///
/// Distinct from both the HTTP request/response models and the storage row
/// model; the adapters map in and out of this type at their edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonObject {
    /// Storage-assigned identifier, immutable once set
    pub id: i64,
    pub object: String,
    pub sf_object_id: String,
    pub schema_id: String,
    pub user_id: String,
}
