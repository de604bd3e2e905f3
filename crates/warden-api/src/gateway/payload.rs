// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Payload validation.
//!
//! Turns a `(resource, operation, JSON payload)` triple into a typed
//! [`Command`], collecting every field problem instead of stopping at the
//! first one.

use serde_json::{Map, Value};
use warden_core::{NewProduct, Operation, ProductId, ProductPatch, ResourceType, Role, UserId};

use crate::error::ValidationErrors;

/// Maximum product name length in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Maximum username length in characters.
pub const MAX_USERNAME_LEN: usize = 150;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

const PRODUCT_FIELDS: &[&str] = &[
    "name",
    "price",
    "category",
    "owner_org",
    "quantity",
    "description",
];

const USER_FIELDS: &[&str] = &["username", "password", "role", "email"];

// =============================================================================
// Command
// =============================================================================

/// A validated gateway operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List all users.
    ListUsers,
    /// Read one user.
    ReadUser(UserId),
    /// Create a user.
    CreateUser(UserDraft),
    /// Update a user.
    UpdateUser(UserId, UserChanges),
    /// Delete a user.
    DeleteUser(UserId),
    /// List all products.
    ListProducts,
    /// Read one product.
    ReadProduct(ProductId),
    /// Create a product.
    CreateProduct(NewProduct),
    /// Update a product.
    UpdateProduct(ProductId, ProductPatch),
    /// Delete a product.
    DeleteProduct(ProductId),
}

impl Command {
    /// Returns the entity ID the command addresses, if any.
    pub fn target_id(&self) -> Option<String> {
        match self {
            Command::ReadUser(id) | Command::UpdateUser(id, _) | Command::DeleteUser(id) => {
                Some(id.to_string())
            }
            Command::ReadProduct(id)
            | Command::UpdateProduct(id, _)
            | Command::DeleteProduct(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// A user to create. The password is still plaintext.
#[derive(Clone, PartialEq)]
pub struct UserDraft {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Role, `User` unless given.
    pub role: Role,
    /// Contact email.
    pub email: Option<String>,
}

impl std::fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDraft")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Changes to a user. The password is still plaintext.
#[derive(Clone, Default, PartialEq)]
pub struct UserChanges {
    /// New login name.
    pub username: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New email.
    pub email: Option<String>,
}

impl std::fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserChanges")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("role", &self.role)
            .field("email", &self.email)
            .finish()
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Decodes a request body. An empty body is an empty object.
pub fn decode_body(body: &[u8]) -> Result<Value, ValidationErrors> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationErrors::single("payload", format!("must be valid JSON ({})", e)))
}

/// Validates a payload for the given resource and operation.
pub fn parse_command(
    resource: ResourceType,
    operation: Operation,
    payload: &Value,
) -> Result<Command, ValidationErrors> {
    if operation == Operation::List {
        return Ok(match resource {
            ResourceType::User => Command::ListUsers,
            ResourceType::Product => Command::ListProducts,
        });
    }

    let Some(object) = payload.as_object() else {
        return Err(ValidationErrors::single("payload", "must be a JSON object"));
    };

    let mut errors = ValidationErrors::new();
    let command = match (resource, operation) {
        (ResourceType::Product, Operation::Create) => {
            product_fields(object, true, &mut errors).map(|fields| {
                let mut product = NewProduct::new(
                    fields.name.unwrap_or_default(),
                    fields.price.unwrap_or_default(),
                );
                if let Some(category) = fields.category {
                    product.category = category;
                }
                if let Some(owner_org) = fields.owner_org {
                    product.owner_org = owner_org;
                }
                product.quantity = fields.quantity.unwrap_or(0);
                product.description = fields.description;
                Command::CreateProduct(product)
            })
        }
        (ResourceType::Product, Operation::Update) => {
            let id = required_id(object, &mut errors).map(ProductId::from_uuid);
            require_any(object, PRODUCT_FIELDS, &mut errors);
            let fields = product_fields(object, false, &mut errors);
            id.zip(fields)
                .map(|(id, patch)| Command::UpdateProduct(id, patch))
        }
        (ResourceType::Product, Operation::Read) => required_id(object, &mut errors)
            .map(|id| Command::ReadProduct(ProductId::from_uuid(id))),
        (ResourceType::Product, Operation::Delete) => required_id(object, &mut errors)
            .map(|id| Command::DeleteProduct(ProductId::from_uuid(id))),
        (ResourceType::User, Operation::Create) => user_draft(object, &mut errors),
        (ResourceType::User, Operation::Update) => {
            let id = required_id(object, &mut errors).map(UserId::from_uuid);
            require_any(object, USER_FIELDS, &mut errors);
            let changes = user_changes(object, &mut errors);
            id.map(|id| Command::UpdateUser(id, changes))
        }
        (ResourceType::User, Operation::Read) => {
            required_id(object, &mut errors).map(|id| Command::ReadUser(UserId::from_uuid(id)))
        }
        (ResourceType::User, Operation::Delete) => {
            required_id(object, &mut errors).map(|id| Command::DeleteUser(UserId::from_uuid(id)))
        }
        (_, Operation::List) => None,
    };

    match command {
        Some(command) if errors.is_empty() => Ok(command),
        _ => {
            if errors.is_empty() {
                errors.add("payload", "invalid payload");
            }
            Err(errors)
        }
    }
}

/// Applies the password rules to `password`, reporting under `field`.
pub fn check_password_rules(field: &str, password: &str, errors: &mut ValidationErrors) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        );
    } else if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, "must not be entirely numeric");
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// Treats JSON `null` the same as an absent field.
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|v| !v.is_null())
}

fn require_any(object: &Map<String, Value>, fields: &[&str], errors: &mut ValidationErrors) {
    if !fields.iter().any(|f| field(object, f).is_some()) {
        errors.add(
            "payload",
            format!("at least one of {} is required", fields.join(", ")),
        );
    }
}

fn required_id(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<uuid::Uuid> {
    match field(object, "id") {
        None => {
            errors.add("id", "is required");
            None
        }
        Some(Value::String(s)) => match uuid::Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("id", "must be a valid UUID");
                None
            }
        },
        Some(_) => {
            errors.add("id", "must be a string");
            None
        }
    }
}

fn optional_string(
    object: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match field(object, name) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add(name, "must be a string");
            None
        }
    }
}

fn required_string(
    object: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    if field(object, name).is_none() {
        errors.add(name, "is required");
        return None;
    }
    optional_string(object, name, errors)
}

fn check_product_name(name: &str, errors: &mut ValidationErrors) -> bool {
    if name.trim().is_empty() {
        errors.add("name", "must not be empty");
        false
    } else if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        errors.add(
            "name",
            format!("must be at most {} characters", MAX_PRODUCT_NAME_LEN),
        );
        false
    } else {
        true
    }
}

fn price(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<f64> {
    match field(object, "price") {
        None => None,
        Some(value) => match value.as_f64() {
            Some(p) if p.is_finite() && p >= 0.0 => Some(p),
            Some(_) => {
                errors.add("price", "must be a finite number >= 0");
                None
            }
            None => {
                errors.add("price", "must be a number");
                None
            }
        },
    }
}

fn quantity(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<u32> {
    match field(object, "quantity") {
        None => None,
        Some(value) => match value.as_u64().and_then(|q| u32::try_from(q).ok()) {
            Some(q) => Some(q),
            None => {
                errors.add("quantity", "must be a non-negative integer");
                None
            }
        },
    }
}

/// Collects product fields. With `create`, `name` and `price` are required.
fn product_fields(
    object: &Map<String, Value>,
    create: bool,
    errors: &mut ValidationErrors,
) -> Option<ProductPatch> {
    let before = errors.fields.len();

    let name = if create {
        required_string(object, "name", errors)
    } else {
        optional_string(object, "name", errors)
    };
    let name = name.filter(|n| check_product_name(n, errors));

    let price = price(object, errors);
    if create && field(object, "price").is_none() {
        errors.add("price", "is required");
    }

    let patch = ProductPatch {
        name,
        price,
        category: optional_string(object, "category", errors),
        owner_org: optional_string(object, "owner_org", errors),
        quantity: quantity(object, errors),
        description: optional_string(object, "description", errors),
    };

    (errors.fields.len() == before).then_some(patch)
}

fn role(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Role> {
    let raw = optional_string(object, "role", errors)?;
    match raw.as_str() {
        "admin" => Some(Role::Admin),
        "user" => Some(Role::User),
        _ => {
            errors.add("role", "must be one of: admin, user");
            None
        }
    }
}

fn check_username(username: &str, errors: &mut ValidationErrors) -> bool {
    if username.is_empty() {
        errors.add("username", "must not be empty");
        false
    } else if username.chars().count() > MAX_USERNAME_LEN {
        errors.add(
            "username",
            format!("must be at most {} characters", MAX_USERNAME_LEN),
        );
        false
    } else if username.chars().any(char::is_whitespace) {
        errors.add("username", "must not contain whitespace");
        false
    } else {
        true
    }
}

fn email(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<String> {
    let email = optional_string(object, "email", errors)?;
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false)
        && !email.chars().any(char::is_whitespace);
    if valid {
        Some(email)
    } else {
        errors.add("email", "must be a valid email address");
        None
    }
}

fn user_draft(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Command> {
    let username =
        required_string(object, "username", errors).filter(|u| check_username(u, errors));
    let password = required_string(object, "password", errors);
    if let Some(password) = &password {
        check_password_rules("password", password, errors);
    }
    let role = role(object, errors).unwrap_or_default();
    let email = email(object, errors);

    Some(Command::CreateUser(UserDraft {
        username: username?,
        password: password?,
        role,
        email,
    }))
}

fn user_changes(object: &Map<String, Value>, errors: &mut ValidationErrors) -> UserChanges {
    let username =
        optional_string(object, "username", errors).filter(|u| check_username(u, errors));
    let password = optional_string(object, "password", errors);
    if let Some(password) = &password {
        check_password_rules("password", password, errors);
    }

    UserChanges {
        username,
        password,
        role: role(object, errors),
        email: email(object, errors),
    }
}

// =============================================================================
// Tests
// =============================================================================
