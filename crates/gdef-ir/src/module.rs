//! Modules for multi-function programs.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use crate::Function;

/// A module containing multiple functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    /// Functions in this module, indexed by name.
    pub functions: BTreeMap<String, Function>,
    /// Name of the entry function (if any).
    pub entry_function: Option<String>,
}

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function to this module, keyed by its own name.
    ///
    /// Returns the function previously registered under that name, if any.
    pub fn add_function(&mut self, func: Function) -> Option<Function> {
        self.functions.insert(func.name.clone(), func)
    }

    /// Get a function by name.
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Set the entry function.
    ///
    /// Returns `false` (and leaves the entry unchanged) if the module has no
    /// function with that name.
    pub fn set_entry_function(&mut self, name: String) -> bool {
        if !self.functions.contains_key(&name) {
            return false;
        }
        self.entry_function = Some(name);
        true
    }

    /// Get the entry function.
    pub fn entry_function(&self) -> Option<&Function> {
        self.entry_function
            .as_ref()
            .and_then(|name| self.functions.get(name))
    }

    /// Get the number of functions in this module.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Get all function names, in sorted order.
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {{")?;
        if let Some(entry) = &self.entry_function {
            writeln!(f, "entry: %{}", entry)?;
        }
        for func in self.functions.values() {
            writeln!(f, "{}", func)?;
        }
        write!(f, "}}")
    }
}
