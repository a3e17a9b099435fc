//! Logic-layer entities for the user resource

/// Input to a create call; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}
