#![allow(dead_code)]

use facade::{BoundArguments, Class, Instance, Method, MethodSignature, Value};
use lazy_static::lazy_static;
use std::sync::Arc;

// ============================================================================
// Method bodies
// ============================================================================

/// Render every bound argument, in signature order, as `name=value`.
pub fn describe(name: &str, bound: &BoundArguments) -> String {
    let mut parts: Vec<String> = bound
        .params()
        .map(|(param, value)| format!("{param}={value}"))
        .collect();
    if !bound.varargs().is_empty() {
        parts.push(format!("*{}", Value::List(bound.varargs().to_vec())));
    }
    if !bound.varkw().is_empty() {
        parts.push(format!("**{}", Value::Map(bound.varkw().clone())));
    }
    format!("{name}({})", parts.join(", "))
}

/// A method whose body reports exactly what it was called with.
pub fn echo_method(signature: MethodSignature) -> Method {
    let name = signature.name().to_owned();
    Method::new(signature, move |_: &Instance, bound: &BoundArguments| {
        describe(&name, bound)
    })
}

fn add_column() -> Method {
    echo_method(
        MethodSignature::builder("add_column")
            .param("table_name")
            .param("column")
            .param_default("schema", Value::None)
            .build()
            .unwrap(),
    )
    .with_doc("Issue an \"add column\" instruction.")
}

fn execute() -> Method {
    echo_method(
        MethodSignature::builder("execute")
            .param("sql")
            .param_default("execution_options", Value::None)
            .varargs("multiparams")
            .varkw("params")
            .build()
            .unwrap(),
    )
}

fn create_index() -> Method {
    echo_method(
        MethodSignature::builder("create_index")
            .param("index_name")
            .param("table_name")
            .param("columns")
            .param_default("unique", false)
            .varkw("kw")
            .build()
            .unwrap(),
    )
}

fn batch_alter_table() -> Method {
    echo_method(
        MethodSignature::builder("batch_alter_table")
            .param("table_name")
            .param_default("recreate", "auto")
            .build()
            .unwrap(),
    )
}

fn get_bind() -> Method {
    echo_method(MethodSignature::builder("_get_bind").build().unwrap())
}

/// Build a fresh operations class. Tests that add members use their own copy.
pub fn operations_class() -> Arc<Class> {
    Class::builder("Operations")
        .attribute("dialect", "sqlite")
        .attribute("_migration_context", Value::None)
        .method("add_column", add_column())
        .method("execute", execute())
        .method("create_index", create_index())
        .method("_get_bind", get_bind())
        .build()
        .unwrap()
}

// ============================================================================
// Shared class hierarchies
// ============================================================================

lazy_static! {
    pub static ref OPERATIONS: Arc<Class> = operations_class();
    pub static ref BATCH_OPERATIONS: Arc<Class> = Class::builder("BatchOperations")
        .base(&OPERATIONS)
        .method("batch_alter_table", batch_alter_table())
        .build()
        .unwrap();

    pub static ref BASE: Arc<Class> = Class::builder("Base").build().unwrap();
    pub static ref DERIVED: Arc<Class> = Class::builder("Derived").base(&BASE).build().unwrap();
    pub static ref UNRELATED: Arc<Class> = Class::builder("Unrelated").build().unwrap();
}
