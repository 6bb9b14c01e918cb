//! Process-wide bookkeeping: the build lock and the class-name registry

use crate::class::ClassHandle;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Serializes class construction. Building mutates bookkeeping shared with
/// the superclass, so concurrent builds against the same hierarchy are not
/// safe; one coarse lock covers the whole pipeline. Reentrant, because a
/// creation hook may itself build classes.
static BUILD_LOCK: Lazy<ReentrantMutex<()>> = Lazy::new(|| ReentrantMutex::new(()));

pub(crate) fn build_lock() -> ReentrantMutexGuard<'static, ()> {
    BUILD_LOCK.lock()
}

/// Global registry of display-named classes.
///
/// The builder records every class built with a name; classes live for the
/// rest of the process, and the registry is the lookup table over them for
/// diagnostics and tooling. Rebuilding under the same name overwrites the
/// entry (latest build wins).
pub struct ClassRegistry {
    classes: DashMap<String, ClassHandle>,
}

static GLOBAL_REGISTRY: Lazy<ClassRegistry> = Lazy::new(|| ClassRegistry {
    classes: DashMap::new(),
});

impl ClassRegistry {
    /// The process-wide registry
    pub fn global() -> &'static ClassRegistry {
        &GLOBAL_REGISTRY
    }

    /// Record a class under its display name
    pub fn register(&self, name: &str, class: &ClassHandle) {
        self.classes.insert(name.to_string(), class.clone());
    }

    /// Look up a class by display name
    pub fn lookup(&self, name: &str) -> Option<ClassHandle> {
        self.classes.get(name).map(|entry| entry.clone())
    }

    /// Whether a class is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes
    pub fn count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{MemberMap, Method, Value};

    #[test]
    fn test_register_and_lookup() {
        let class = ClassHandle::foreign(
            Some("RegistryProbe"),
            None,
            Method::new(|_, _| Ok(Value::Null)),
            MemberMap::default(),
        );
        ClassRegistry::global().register("RegistryProbe", &class);

        let found = ClassRegistry::global().lookup("RegistryProbe").unwrap();
        assert_eq!(found, class);
        assert!(ClassRegistry::global().contains("RegistryProbe"));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let first = ClassHandle::foreign(
            Some("RegistryDupe"),
            None,
            Method::new(|_, _| Ok(Value::Null)),
            MemberMap::default(),
        );
        let second = ClassHandle::foreign(
            Some("RegistryDupe"),
            None,
            Method::new(|_, _| Ok(Value::Null)),
            MemberMap::default(),
        );
        let registry = ClassRegistry::global();
        registry.register("RegistryDupe", &first);
        registry.register("RegistryDupe", &second);

        assert_eq!(registry.lookup("RegistryDupe").unwrap(), second);
    }

    #[test]
    fn test_missing_lookup() {
        assert!(ClassRegistry::global().lookup("NoSuchClassAnywhere").is_none());
    }
}
