// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission engine.
//!
//! The engine holds a flat table of allow rules. A (role, resource, operation)
//! triple is allowed only if the exact triple is in the table.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use warden_core::{Operation, ResourceType, Role};

use super::permission::{Permission, PermissionSet};

// =============================================================================
// Decision
// =============================================================================

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation is refused.
    Deny,
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

// =============================================================================
// Authorizer
// =============================================================================

/// Decides whether a role may perform an operation on a resource type.
///
/// Implementations must be pure and fail closed.
pub trait Authorizer: Send + Sync {
    /// Returns the decision for the triple.
    fn decide(&self, role: Role, resource: ResourceType, operation: Operation) -> Decision;

    /// Returns every permission [`decide`](Self::decide) allows for the role.
    fn permissions_for(&self, role: Role) -> PermissionSet {
        Permission::all()
            .into_iter()
            .filter(|p| self.decide(role, p.resource, p.operation).is_allowed())
            .collect()
    }
}

/// A granted (role, resource, operation) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    /// Role the rule applies to.
    pub role: Role,
    /// Granted permission.
    pub permission: Permission,
}

// =============================================================================
// PermissionEngine
// =============================================================================

/// Table-driven [`Authorizer`].
///
/// Immutable after construction and cheap to clone.
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    rules: Arc<HashSet<(Role, ResourceType, Operation)>>,
}

impl PermissionEngine {
    /// Creates the engine with the standard table.
    ///
    /// | role  | resource | allowed operations        |
    /// |-------|----------|---------------------------|
    /// | admin | user     | create, update, delete, list |
    /// | admin | product  | create, update, delete, list |
    /// | user  | product  | list, read                |
    pub fn standard() -> Self {
        use Operation::*;

        Self::builder()
            .allow_all(Role::Admin, ResourceType::User, &[Create, Update, Delete, List])
            .allow_all(
                Role::Admin,
                ResourceType::Product,
                &[Create, Update, Delete, List],
            )
            .allow_all(Role::User, ResourceType::Product, &[List, Read])
            .build()
    }

    /// Creates a builder for a custom table.
    pub fn builder() -> PermissionEngineBuilder {
        PermissionEngineBuilder::default()
    }

    /// Decides a triple given by names. Unknown names are denied.
    pub fn decide_named(&self, role: &str, resource: &str, operation: &str) -> Decision {
        match (
            Role::parse(role),
            ResourceType::parse(resource),
            Operation::parse(operation),
        ) {
            (Some(role), Some(resource), Some(operation)) => {
                self.decide(role, resource, operation)
            }
            _ => Decision::Deny,
        }
    }

    /// Returns every granted rule, sorted.
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .rules
            .iter()
            .map(|(role, resource, operation)| Rule {
                role: *role,
                permission: Permission::new(*resource, *operation),
            })
            .collect();
        rules.sort_by_key(|r| (r.role, r.permission));
        rules
    }
}

impl Default for PermissionEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl Authorizer for PermissionEngine {
    fn decide(&self, role: Role, resource: ResourceType, operation: Operation) -> Decision {
        if self.rules.contains(&(role, resource, operation)) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

// =============================================================================
// PermissionEngineBuilder
// =============================================================================

/// Builder for custom permission tables.
#[derive(Debug, Default)]
pub struct PermissionEngineBuilder {
    rules: HashSet<(Role, ResourceType, Operation)>,
}

impl PermissionEngineBuilder {
    /// Allows one triple.
    pub fn allow(mut self, role: Role, resource: ResourceType, operation: Operation) -> Self {
        self.rules.insert((role, resource, operation));
        self
    }

    /// Allows several operations on one resource.
    pub fn allow_all(mut self, role: Role, resource: ResourceType, operations: &[Operation]) -> Self {
        for operation in operations {
            self.rules.insert((role, resource, *operation));
        }
        self
    }

    /// Builds the engine.
    pub fn build(self) -> PermissionEngine {
        PermissionEngine {
            rules: Arc::new(self.rules),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
