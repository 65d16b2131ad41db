use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::builtins;
use crate::value::Value;

/// A callable exposed to templates. Errors are plain messages; the evaluator
/// attaches the function name and call-site span.
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

static SHARED: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Named constants and functions visible to every script evaluated against
/// it. Variables passed at evaluation time shadow constants.
#[derive(Clone)]
pub struct Registry {
    constants: HashMap<String, Value>,
    functions: HashMap<String, Function>,
}

impl Registry {
    /// A registry with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constants: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    /// The default constants (`true false null PI E inf nan`) and the
    /// builtin function library.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .set_constant("true", true)
            .set_constant("false", false)
            .set_constant("null", Value::Null)
            .set_constant("PI", std::f64::consts::PI)
            .set_constant("E", std::f64::consts::E)
            .set_constant("inf", f64::INFINITY)
            .set_constant("nan", f64::NAN);
        builtins::register_all(&mut registry);
        registry
    }

    /// Process-wide default instance, built on first use and never mutated.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Define or overwrite a constant.
    pub fn set_constant(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    /// Define or overwrite a function.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted.
    #[must_use]
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("constants", &self.constants)
            .field("functions", &self.function_names())
            .finish()
    }
}
