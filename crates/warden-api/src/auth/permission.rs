// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission definitions.
//!
//! A permission pairs a resource type with an operation and is written as
//! `resource:operation`, e.g. `product:list`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use warden_core::{Operation, ResourceType};

/// A single (resource, operation) grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permission {
    /// Targeted resource type.
    pub resource: ResourceType,
    /// Allowed operation.
    pub operation: Operation,
}

impl Permission {
    /// Creates a permission.
    pub const fn new(resource: ResourceType, operation: Operation) -> Self {
        Self {
            resource,
            operation,
        }
    }

    /// Parses `resource:operation`.
    pub fn parse(s: &str) -> Option<Self> {
        let (resource, operation) = s.split_once(':')?;
        Some(Self::new(
            ResourceType::parse(resource)?,
            Operation::parse(operation)?,
        ))
    }

    /// Returns every possible permission.
    pub fn all() -> Vec<Permission> {
        ResourceType::all()
            .iter()
            .flat_map(|r| Operation::all().iter().map(move |o| Permission::new(*r, *o)))
            .collect()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.operation)
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Permission::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Unknown permission: {}", s)))
    }
}

// =============================================================================
// PermissionSet
// =============================================================================

/// An ordered set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Iterates over the permissions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
