// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core domain types for Warden.
//!
//! These types describe the catalog entities guarded by the gateway (users and
//! products) together with the vocabulary the permission table is written in:
//! roles, resource types and operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a user account.
    ///
    /// This is the `sub` claim of every token issued for the user.
    UserId
}

uuid_id! {
    /// A unique identifier for a catalog product.
    ProductId
}

// =============================================================================
// Role
// =============================================================================

/// Coarse permission class assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full catalog and account administration.
    Admin,
    /// Read-only catalog access.
    User,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Returns all roles.
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::User]
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ResourceType
// =============================================================================

/// Kind of resource an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// User accounts.
    User,
    /// Catalog products.
    Product,
}

impl ResourceType {
    /// Returns the resource name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Product => "product",
        }
    }

    /// Parses a resource type from a string. Plural forms are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" | "users" => Some(ResourceType::User),
            "product" | "products" => Some(ResourceType::Product),
            _ => None,
        }
    }

    /// Returns all resource types.
    pub fn all() -> &'static [ResourceType] {
        &[ResourceType::User, ResourceType::Product]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Operation
// =============================================================================

/// Operation requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create a new entity.
    Create,
    /// Read a single entity.
    Read,
    /// Modify an existing entity.
    Update,
    /// Remove an entity.
    Delete,
    /// Enumerate entities.
    List,
}

impl Operation {
    /// Returns the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }

    /// Parses an operation from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(Operation::Create),
            "read" | "get" => Some(Operation::Read),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            "list" => Some(Operation::List),
            _ => None,
        }
    }

    /// Returns all operations.
    pub fn all() -> &'static [Operation] {
        &[
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::List,
        ]
    }

    /// Returns `true` if the operation changes persisted state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A stored user account.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the public view of this user (without the password hash).
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Public representation of a user, safe to return from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// Unique identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Assigned role.
    pub role: Role,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a user.
#[derive(Clone)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Already hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Contact email.
    pub email: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial update of a user. `None` fields are left unchanged.
#[derive(Clone, Default)]
pub struct UserPatch {
    /// New login name.
    pub username: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New email.
    pub email: Option<String>,
}

impl UserPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.email.is_none()
    }
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("email", &self.email)
            .finish()
    }
}

// =============================================================================
// Product
// =============================================================================

/// Default category assigned to products created without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Category slug.
    pub category: String,
    /// Owning organization.
    pub owner_org: String,
    /// Units in stock.
    pub quantity: u32,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Category slug.
    pub category: String,
    /// Owning organization.
    pub owner_org: String,
    /// Units in stock.
    pub quantity: u32,
    /// Free-form description.
    pub description: Option<String>,
}

impl NewProduct {
    /// Creates a product draft with default category, organization and stock.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            category: DEFAULT_CATEGORY.to_string(),
            owner_org: String::new(),
            quantity: 0,
            description: None,
        }
    }

    /// Sets the stock quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the owning organization.
    pub fn with_owner_org(mut self, owner_org: impl Into<String>) -> Self {
        self.owner_org = owner_org.into();
        self
    }
}

/// Partial update of a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    /// New display name.
    pub name: Option<String>,
    /// New unit price.
    pub price: Option<f64>,
    /// New category.
    pub category: Option<String>,
    /// New owning organization.
    pub owner_org: Option<String>,
    /// New stock quantity.
    pub quantity: Option<u32>,
    /// New description.
    pub description: Option<String>,
}

impl ProductPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.owner_org.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("manager"), None);
    }

    #[test]
    fn test_resource_and_operation_parse() {
        assert_eq!(ResourceType::parse("products"), Some(ResourceType::Product));
        assert_eq!(ResourceType::parse("orders"), None);
        assert_eq!(Operation::parse("list"), Some(Operation::List));
        assert_eq!(Operation::parse("purge"), None);
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_user_id_roundtrip_through_str() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_user_debug_hides_hash() {
        let user = User {
            id: UserId::new(),
            username: "owner".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            email: None,
            created_at: Utc::now(),
        };
        let debug = format!("{:?}", user);
        assert!(!debug.contains("argon2id"));
        let view = serde_json::to_value(user.view()).unwrap();
        assert!(view.get("password_hash").is_none());
    }

    #[test]
    fn test_mutating_operations() {
        assert!(Operation::Create.is_mutating());
        assert!(Operation::Delete.is_mutating());
        assert!(!Operation::List.is_mutating());
        assert!(!Operation::Read.is_mutating());
    }
}
