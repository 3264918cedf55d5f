//! Name-keyed check factories, collected at link time.
//!
//! Each check registers itself with
//! `#[linkme::distributed_slice(CHECKS)]` and is resolved by name when the
//! scheduler builds its instances.

use crate::error::RegistryError;

use super::Check;

pub struct CheckEntry {
    /// Stable name the scheduler refers to the check by (e.g. "cpu")
    pub name: &'static str,
    pub description: &'static str,
    /// Builds a fresh, unconfigured instance
    pub factory: fn() -> Box<dyn Check>,
}

#[linkme::distributed_slice]
pub static CHECKS: [CheckEntry] = [..];

/// Builds a new unconfigured instance of the check registered as `name`.
pub fn resolve_check(name: &str) -> Result<Box<dyn Check>, RegistryError> {
    for entry in CHECKS {
        if entry.name == name {
            return Ok((entry.factory)());
        }
    }

    Err(RegistryError::UnknownCheck {
        name: name.to_string(),
        available: CHECKS.iter().map(|e| e.name).collect(),
    })
}

/// `(name, description)` of every registered check.
pub fn list_checks() -> Vec<(&'static str, &'static str)> {
    CHECKS.iter().map(|e| (e.name, e.description)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_check_is_registered() {
        let check = resolve_check("cpu").unwrap();
        assert_eq!(check.name(), "cpu");
        assert!(list_checks().iter().any(|(name, _)| *name == "cpu"));
    }

    #[test]
    fn each_resolve_builds_a_fresh_instance() {
        let mut first = resolve_check("cpu").unwrap();
        let mut second = resolve_check("cpu").unwrap();
        // configuring one instance must not mark the other as configured
        if first.configure(&toml::Table::new()).is_ok() {
            assert!(second.configure(&toml::Table::new()).is_ok());
        }
    }

    #[test]
    fn unknown_check_lists_available() {
        match resolve_check("memory") {
            Err(RegistryError::UnknownCheck { name, available }) => {
                assert_eq!(name, "memory");
                assert!(available.contains(&"cpu"));
            }
            Ok(_) => panic!("resolved a check that was never registered"),
        }
    }
}
