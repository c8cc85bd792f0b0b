//! Resource store — the owning registry for every managed resource.
//!
//! Resources are created once during device initialization and live for the
//! process lifetime. The store is the single home of resource values and
//! metadata; every mutation funnels through it on the dispatcher's thread of
//! execution, so it needs no internal locking.
//!
//! Handles are plain indices into an arena. They are only ever minted by
//! [`ResourceStore::create`] and resources are never destroyed, so a handle
//! is valid for as long as the store that issued it.

use core::fmt;

use crate::error::StoreError;

// ───────────────────────────────────────────────────────────────
// Paths
// ───────────────────────────────────────────────────────────────

/// Hierarchical resource address: object / object-instance / resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    pub object: u16,
    pub instance: u16,
    pub resource: u16,
}

impl ResourcePath {
    /// Parse a `"3200/0/5501"`-style path. A leading `/` is tolerated —
    /// device tables in the field mix both spellings.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        let mut parts = trimmed.split('/');
        let object = Self::segment(parts.next())?;
        let instance = Self::segment(parts.next())?;
        let resource = Self::segment(parts.next())?;
        if parts.next().is_some() {
            return Err(StoreError::InvalidPath);
        }
        Ok(Self {
            object,
            instance,
            resource,
        })
    }

    fn segment(part: Option<&str>) -> Result<u16, StoreError> {
        part.and_then(|p| p.parse::<u16>().ok())
            .ok_or(StoreError::InvalidPath)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.object, self.instance, self.resource)
    }
}

// ───────────────────────────────────────────────────────────────
// Access mask
// ───────────────────────────────────────────────────────────────

/// Access mask for a resource: any combination of READ, WRITE, EXECUTE.
///
/// READ maps to remote GET/observe, WRITE to PUT, EXECUTE to POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access(u8);

impl Access {
    pub const READ: Self = Self(0b001);
    pub const WRITE: Self = Self(0b010);
    pub const EXECUTE: Self = Self(0b100);

    /// True when every method in `other` is allowed by `self`.
    pub const fn allows(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for Access {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Values
// ───────────────────────────────────────────────────────────────

/// A resource's current value. The variant is fixed at creation and never
/// changes across the resource's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Variant tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Str,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "string"),
        }
    }
}

/// Stable index of a resource in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(u32);

impl ResourceHandle {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

// ───────────────────────────────────────────────────────────────
// Store
// ───────────────────────────────────────────────────────────────

struct Resource {
    path: ResourcePath,
    name: String,
    value: Value,
    access: Access,
    observable: bool,
}

/// Arena of managed resources.
pub struct ResourceStore {
    resources: Vec<Resource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Register a resource. `initial` fixes the value variant for the
    /// resource's whole lifetime.
    pub fn create(
        &mut self,
        path: &str,
        name: &str,
        access: Access,
        initial: Value,
    ) -> Result<ResourceHandle, StoreError> {
        let path = ResourcePath::parse(path)?;
        if self.resources.iter().any(|r| r.path == path) {
            return Err(StoreError::DuplicatePath);
        }
        self.resources.push(Resource {
            path,
            name: name.to_owned(),
            value: initial,
            access,
            observable: false,
        });
        Ok(ResourceHandle(self.resources.len() as u32 - 1))
    }

    /// Replace the value. Rejects a variant change with `TypeMismatch`,
    /// leaving the stored value intact.
    pub fn set(&mut self, handle: ResourceHandle, value: Value) -> Result<(), StoreError> {
        let slot = &mut self.resources[handle.index()];
        if slot.value.kind() != value.kind() {
            return Err(StoreError::TypeMismatch {
                expected: slot.value.kind(),
                got: value.kind(),
            });
        }
        slot.value = value;
        Ok(())
    }

    pub fn value(&self, handle: ResourceHandle) -> &Value {
        &self.resources[handle.index()].value
    }

    /// Integer view of the current value. Float truncates; strings parse
    /// atoi-style (unparseable → 0).
    pub fn value_int(&self, handle: ResourceHandle) -> i64 {
        match &self.resources[handle.index()].value {
            Value::Int(v) => *v,
            Value::Float(v) => *v as i64,
            Value::Str(s) => s.trim().parse::<i64>().unwrap_or(0),
        }
    }

    /// String rendering of the current value.
    pub fn value_string(&self, handle: ResourceHandle) -> String {
        match &self.resources[handle.index()].value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    pub fn kind(&self, handle: ResourceHandle) -> ValueKind {
        self.resources[handle.index()].value.kind()
    }

    pub fn set_observable(&mut self, handle: ResourceHandle, observable: bool) {
        self.resources[handle.index()].observable = observable;
    }

    pub fn is_observable(&self, handle: ResourceHandle) -> bool {
        self.resources[handle.index()].observable
    }

    pub fn access(&self, handle: ResourceHandle) -> Access {
        self.resources[handle.index()].access
    }

    pub fn path(&self, handle: ResourceHandle) -> ResourcePath {
        self.resources[handle.index()].path
    }

    pub fn name(&self, handle: ResourceHandle) -> &str {
        &self.resources[handle.index()].name
    }

    /// Resolve a wire path back to its handle, as transport adapters must
    /// when the server addresses a resource.
    pub fn lookup(&self, path: &ResourcePath) -> Option<ResourceHandle> {
        self.resources
            .iter()
            .position(|r| r.path == *path)
            .map(|i| ResourceHandle(i as u32))
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_read_back() {
        let mut store = ResourceStore::new();
        let h = store
            .create("3200/0/5501", "button_count", Access::READ, Value::Int(0))
            .unwrap();
        assert_eq!(store.value(h), &Value::Int(0));
        assert_eq!(store.name(h), "button_count");
        assert_eq!(store.path(h).to_string(), "3200/0/5501");
        assert!(!store.is_observable(h));
    }

    #[test]
    fn leading_slash_is_tolerated() {
        let mut store = ResourceStore::new();
        let h = store
            .create("/3203/0/5510", "light_level", Access::READ, Value::Int(50))
            .unwrap();
        assert_eq!(store.path(h).to_string(), "3203/0/5510");
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let mut store = ResourceStore::new();
        for bad in ["", "3200", "3200/0", "3200/0/5501/9", "a/b/c"] {
            assert_eq!(
                store.create(bad, "x", Access::READ, Value::Int(0)),
                Err(StoreError::InvalidPath),
                "path {bad:?}"
            );
        }
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut store = ResourceStore::new();
        store
            .create("3200/0/5501", "a", Access::READ, Value::Int(0))
            .unwrap();
        assert_eq!(
            store.create("/3200/0/5501", "b", Access::READ, Value::Int(0)),
            Err(StoreError::DuplicatePath)
        );
    }

    #[test]
    fn set_rejects_variant_change_and_keeps_prior_value() {
        let mut store = ResourceStore::new();
        let h = store
            .create("3200/0/5501", "button_count", Access::READ, Value::Int(7))
            .unwrap();
        let err = store.set(h, Value::Str("oops".into())).unwrap_err();
        assert_eq!(
            err,
            StoreError::TypeMismatch {
                expected: ValueKind::Int,
                got: ValueKind::Str,
            }
        );
        assert_eq!(store.value(h), &Value::Int(7));
    }

    #[test]
    fn set_same_variant_succeeds() {
        let mut store = ResourceStore::new();
        let h = store
            .create("3201/0/5853", "blink_pattern", Access::READ | Access::WRITE, Value::Str("1:2".into()))
            .unwrap();
        store.set(h, Value::Str("3:4".into())).unwrap();
        assert_eq!(store.value_string(h), "3:4");
    }

    #[test]
    fn value_int_views() {
        let mut store = ResourceStore::new();
        let i = store
            .create("1/0/1", "i", Access::READ, Value::Int(42))
            .unwrap();
        let f = store
            .create("1/0/2", "f", Access::READ, Value::Float(9.7))
            .unwrap();
        let s = store
            .create("1/0/3", "s", Access::READ, Value::Str("13".into()))
            .unwrap();
        let junk = store
            .create("1/0/4", "junk", Access::READ, Value::Str("abc".into()))
            .unwrap();
        assert_eq!(store.value_int(i), 42);
        assert_eq!(store.value_int(f), 9);
        assert_eq!(store.value_int(s), 13);
        assert_eq!(store.value_int(junk), 0);
    }

    #[test]
    fn access_mask_allows() {
        let mask = Access::READ | Access::WRITE;
        assert!(mask.allows(Access::READ));
        assert!(mask.allows(Access::WRITE));
        assert!(!mask.allows(Access::EXECUTE));
        assert!(mask.allows(Access::READ | Access::WRITE));
    }

    #[test]
    fn observable_flag_toggles() {
        let mut store = ResourceStore::new();
        let h = store
            .create("3203/0/5510", "light_level", Access::READ, Value::Int(50))
            .unwrap();
        store.set_observable(h, true);
        assert!(store.is_observable(h));
        store.set_observable(h, false);
        assert!(!store.is_observable(h));
    }
}
