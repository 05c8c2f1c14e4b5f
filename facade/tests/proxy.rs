//! Integration tests for the proxy registry.

mod common;

use common::{BATCH_OPERATIONS, OPERATIONS, echo_method, operations_class};
use facade::{
    Args, ArgumentTranslationError, BindError, CallError, Class, FacadeError, Instance,
    LegacyNames, MethodSignature, ProxyOptions, ProxyRegistry, RegistryError, Value,
    testing::CallRecorder,
};
use std::sync::Arc;

fn call_cases() -> Vec<(&'static str, Args)> {
    vec![
        ("add_column", Args::new().arg("account").arg("name")),
        (
            "add_column",
            Args::new().arg("account").arg("name").arg("public"),
        ),
        (
            "add_column",
            Args::new()
                .kwarg("column", "name")
                .kwarg("table_name", "account")
                .kwarg("schema", "public"),
        ),
        ("execute", Args::new().arg("SELECT 1")),
        (
            "execute",
            Args::new()
                .arg("INSERT")
                .arg(Value::None)
                .arg(1)
                .arg(2)
                .kwarg("timeout", 5),
        ),
        (
            "create_index",
            Args::new()
                .arg("ix_account_name")
                .arg("account")
                .arg(vec!["name"])
                .kwarg("unique", true)
                .kwarg("postgresql_using", "gin"),
        ),
    ]
}

#[test]
fn test_facade_calls_match_direct_calls() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    let instance = Arc::new(Instance::new(OPERATIONS.clone()));
    registry.attach_instance(&instance);

    for (name, args) in call_cases() {
        let direct = instance.call_method(name, args.clone()).unwrap();
        let proxied = registry.call(op, name, args).unwrap();
        assert_eq!(direct, proxied, "{name}");
    }
}

#[test]
fn test_facade_rejects_what_direct_call_rejects() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();
    let instance = Arc::new(Instance::new(OPERATIONS.clone()));
    registry.attach_instance(&instance);

    let bad = [
        Args::new().arg("account"),
        Args::new().arg("a").arg("b").arg("c").arg("d"),
        Args::new().arg("a").arg("b").kwarg("table_name", "c"),
        Args::new().arg("a").arg("b").kwarg("nullable", true),
    ];
    for args in bad {
        let direct = match instance.call_method("add_column", args.clone()) {
            Err(CallError::Binding(err)) => err,
            other => panic!("expected a binding error, got {other:?}"),
        };
        let proxied = match registry.call(op, "add_column", args) {
            Err(FacadeError::Call(CallError::Binding(err))) => err,
            other => panic!("expected a binding error, got {other:?}"),
        };
        assert_eq!(direct, proxied);
    }
}

#[test]
fn test_attach_binds_public_attributes_only() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    let instance = Arc::new(Instance::new(OPERATIONS.clone()).with_attr("dialect", "postgresql"));
    registry.attach_instance(&instance);

    let scope = registry.scope(op).unwrap();
    assert_eq!(scope.get("dialect"), Some(&Value::from("postgresql")));
    assert!(!scope.contains("_migration_context"));
    assert!(!scope.contains("_get_bind"));
    assert!(scope.facade("add_column").is_some());
    assert_eq!(
        scope.facade("add_column").unwrap().doc(),
        Some("Issue an \"add column\" instruction.")
    );
    assert!(Arc::ptr_eq(scope.active().unwrap(), &instance));
}

#[test]
fn test_subclass_exposes_inherited_members() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&BATCH_OPERATIONS, op).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(BATCH_OPERATIONS.clone())));

    let out = registry
        .call(op, "batch_alter_table", Args::new().arg("account"))
        .unwrap();
    assert_eq!(
        out,
        Value::from(r#"batch_alter_table(table_name="account", recreate="auto")"#)
    );
    assert!(registry.scope(op).unwrap().facade("add_column").is_some());
    assert_eq!(
        registry.scope(op).unwrap().get("dialect"),
        Some(&Value::from("sqlite"))
    );
}

#[test]
fn test_second_attach_replaces_active_instance() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    let first = Arc::new(Instance::new(OPERATIONS.clone()).with_attr("dialect", "mysql"));
    let second = Arc::new(Instance::new(OPERATIONS.clone()).with_attr("dialect", "oracle"));
    registry.attach_instance(&first);
    registry.attach_instance(&second);

    let scope = registry.scope(op).unwrap();
    assert!(Arc::ptr_eq(scope.active().unwrap(), &second));
    assert_eq!(scope.get("dialect"), Some(&Value::from("oracle")));
}

#[test]
fn test_attribute_and_method_of_same_name_share_a_scope() {
    let operations = operations_class();
    let context = Class::builder("MigrationContext")
        .method(
            "dialect",
            echo_method(MethodSignature::builder("dialect").build().unwrap()),
        )
        .build()
        .unwrap();
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&operations, op).unwrap();
    registry.register_class(&context, op).unwrap();

    registry.attach_instance(&Arc::new(Instance::new(operations.clone())));
    let scope = registry.scope(op).unwrap();
    assert_eq!(scope.get("dialect"), Some(&Value::from("sqlite")));
    assert!(scope.facade("dialect").is_none());
    assert!(matches!(
        registry.call(op, "dialect", Args::new()),
        Err(FacadeError::Call(CallError::UnknownName { .. }))
    ));
    assert_eq!(
        registry
            .call(op, "add_column", Args::new().arg("account").arg("name"))
            .unwrap(),
        Value::from(r#"add_column(table_name="account", column="name", schema=None)"#)
    );

    registry.attach_instance(&Arc::new(Instance::new(context.clone())));
    let scope = registry.scope(op).unwrap();
    assert!(scope.get("dialect").is_none());
    assert_eq!(
        scope.facade("dialect").unwrap().class_name(),
        "MigrationContext"
    );
    assert_eq!(
        registry.call(op, "dialect", Args::new()).unwrap(),
        Value::from("dialect()")
    );
}

#[test]
fn test_detach_clears_scope() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    let instance = Arc::new(Instance::new(OPERATIONS.clone()));
    registry.attach_instance(&instance);
    registry.detach_instance(&instance);

    let scope = registry.scope(op).unwrap();
    assert!(scope.active().is_none());
    assert!(scope.get("dialect").is_none());

    for name in ["add_column", "execute", "create_index"] {
        match scope.call(name, Args::new().arg("a").arg("b").arg("c")) {
            Err(CallError::ProxyNotEstablished { class, member }) => {
                assert_eq!(class, "Operations");
                assert_eq!(member, name);
            }
            other => panic!("expected ProxyNotEstablished, got {other:?}"),
        }
    }
}

#[test]
fn test_call_before_attach_names_class_and_member() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    let err = registry
        .call(op, "add_column", Args::new().arg("account").arg("name"))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'add_column'"), "{message}");
    assert!(message.contains("'Operations'"), "{message}");
}

#[test]
fn test_member_added_reaches_every_scope() {
    let class = operations_class();
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    let context = registry.create_scope("context");
    registry.register_class(&class, op).unwrap();
    registry.register_class(&class, context).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(class.clone())));

    class.set_member(
        "drop_table",
        echo_method(
            MethodSignature::builder("drop_table")
                .param("table_name")
                .build()
                .unwrap(),
        ),
    );
    registry.notify_member_added(&class, "drop_table");

    for scope in [op, context] {
        let out = registry
            .call(scope, "drop_table", Args::new().arg("account"))
            .unwrap();
        assert_eq!(out, Value::from(r#"drop_table(table_name="account")"#));
    }
}

#[test]
fn test_member_added_to_base_reaches_subclass_scope() {
    let base = operations_class();
    let batch = Class::builder("BatchOperations").base(&base).build().unwrap();
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&batch, op).unwrap();

    registry.add_member(&base, "bulk_insert", echo_method(
        MethodSignature::builder("bulk_insert")
            .param("table")
            .param("rows")
            .build()
            .unwrap(),
    ));
    assert!(registry.scope(op).unwrap().facade("bulk_insert").is_some());
}

#[test]
fn test_hidden_prefix_is_configurable() {
    let class = operations_class();
    let mut registry =
        ProxyRegistry::with_options(ProxyOptions::new().with_hidden_prefix("__"));
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();

    assert_eq!(registry.options().hidden_prefix(), "__");
    assert!(registry.scope(op).unwrap().facade("_get_bind").is_some());
}

#[test]
fn test_unknown_names_and_scopes() {
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&OPERATIONS, op).unwrap();

    assert!(matches!(
        registry.call(op, "drop_everything", Args::new()),
        Err(FacadeError::Call(CallError::UnknownName { .. }))
    ));

    let batch_op = registry.create_scope("batch_op");
    let mut other = ProxyRegistry::new();
    other.create_scope("a");
    let foreign = other.create_scope("b");
    assert_eq!(foreign.index(), batch_op.index());
    assert!(matches!(
        registry.call(foreign, "add_column", Args::new()),
        Err(FacadeError::Registry(RegistryError::UnknownScope(1)))
    ));
}

// ============================================================================
// Legacy argument names
// ============================================================================

fn legacy_class(recorder: &CallRecorder) -> Arc<Class> {
    let signature = MethodSignature::builder("create_foreign_key")
        .param("constraint_name")
        .param("source_table")
        .param("referent_table")
        .param_default("onupdate", Value::None)
        .varkw("dialect_kw")
        .build()
        .unwrap();
    let method = recorder.method(signature).with_legacy_names(
        LegacyNames::new()
            .rule("name", "constraint_name")
            .rule("source", "source_table"),
    );
    Class::builder("Operations")
        .method("create_foreign_key", method)
        .build()
        .unwrap()
}

#[test]
fn test_legacy_keyword_is_renamed() {
    let recorder = CallRecorder::new();
    let class = legacy_class(&recorder);
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(class.clone())));

    registry
        .call(
            op,
            "create_foreign_key",
            Args::new()
                .kwarg("name", "fk_user")
                .kwarg("source", "address")
                .kwarg("referent_table", "user"),
        )
        .unwrap();

    let call = recorder.last().unwrap();
    assert_eq!(call.param("constraint_name"), Some(&Value::from("fk_user")));
    assert_eq!(call.param("source_table"), Some(&Value::from("address")));
    assert_eq!(call.param("referent_table"), Some(&Value::from("user")));
    assert!(!call.varkw.contains_key("name"));
    assert!(!call.varkw.contains_key("source"));
}

#[test]
fn test_legacy_old_name_value_is_forwarded_under_new_name() {
    let recorder = CallRecorder::new();
    let class = legacy_class(&recorder);
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(class.clone())));

    registry
        .call(
            op,
            "create_foreign_key",
            Args::new()
                .arg("fk")
                .kwarg("source", 5)
                .kwarg("referent_table", "user")
                .kwarg("onupdate", "CASCADE"),
        )
        .unwrap();

    let call = recorder.last().unwrap();
    assert_eq!(call.param("constraint_name"), Some(&Value::from("fk")));
    assert_eq!(call.param("source_table"), Some(&Value::Int(5)));
    assert_eq!(call.param("onupdate"), Some(&Value::from("CASCADE")));
    assert!(call.varkw.is_empty());
}

#[test]
fn test_legacy_missing_positional_names_parameter() {
    let recorder = CallRecorder::new();
    let class = legacy_class(&recorder);
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(class.clone())));

    let err = registry
        .call(
            op,
            "create_foreign_key",
            Args::new().kwarg("name", "fk_user").arg("address"),
        )
        .unwrap_err();
    match err {
        FacadeError::Call(CallError::ArgumentTranslation(ArgumentTranslationError { param })) => {
            assert_eq!(param, "referent_table");
        }
        other => panic!("expected ArgumentTranslationError, got {other:?}"),
    }
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_translation_error_precedes_proxy_check() {
    let recorder = CallRecorder::new();
    let class = legacy_class(&recorder);
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();

    let err = registry
        .call(op, "create_foreign_key", Args::new())
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Call(CallError::ArgumentTranslation(_))
    ));

    let err = registry
        .call(op, "create_foreign_key", Args::new().arg("a").arg("b").arg("c"))
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Call(CallError::ProxyNotEstablished { .. })
    ));
}

#[test]
fn test_unknown_keyword_still_fails_after_translation() {
    let class = Class::builder("Operations")
        .method(
            "drop_constraint",
            echo_method(
                MethodSignature::builder("drop_constraint")
                    .param("constraint_name")
                    .param("table_name")
                    .build()
                    .unwrap(),
            )
            .with_legacy_names(LegacyNames::new().rule("name", "constraint_name")),
        )
        .build()
        .unwrap();
    let mut registry = ProxyRegistry::new();
    let op = registry.create_scope("op");
    registry.register_class(&class, op).unwrap();
    registry.attach_instance(&Arc::new(Instance::new(class.clone())));

    let err = registry
        .call(
            op,
            "drop_constraint",
            Args::new().arg("uq").arg("account").kwarg("type_", "unique"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Call(CallError::Binding(BindError::UnexpectedKeyword { .. }))
    ));
}
