use proptest::prelude::*;
use vigil_condition::{literal, ConditionEvaluator, ConditionState, ConditionTarget};
use vigil_model::{
    ConditionAnnotation, MethodDescriptor, Object, ParamDescriptor, Severity, TypeDescriptor,
    TypeRegistry, Value, ValueType,
};

fn any_case(word: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_literal_true_is_valid_without_resolution(cond in any_case("true")) {
        // no type table and no matching member: resolution would fail
        let types = TypeRegistry::new();
        let owner = Object::new("Empty");
        let target = ConditionTarget { owner: &owner, value: &Value::Null, declared: None };
        let eval = ConditionEvaluator::new(&types)
            .evaluate(&ConditionAnnotation::new(cond.clone()), &target);
        prop_assert_eq!(literal(&cond), Some(true));
        prop_assert_eq!(eval.state(), ConditionState::Valid);
    }

    #[test]
    fn prop_literal_false_is_invalid(cond in any_case("false"), severity in prop_oneof![
        Just(Severity::Info), Just(Severity::Warning), Just(Severity::Error)
    ]) {
        let types = TypeRegistry::new();
        let owner = Object::new("Empty");
        let target = ConditionTarget { owner: &owner, value: &Value::Null, declared: None };
        let annotation = ConditionAnnotation::new(cond).with_severity(severity);
        let eval = ConditionEvaluator::new(&types).evaluate(&annotation, &target);
        prop_assert_eq!(eval.state(), ConditionState::Invalid);
        prop_assert_eq!(eval.severity(), severity);
    }

    #[test]
    fn prop_method_receives_field_value(n in any::<i64>()) {
        let types = TypeRegistry::new().with(TypeDescriptor::new("Probe").method(
            MethodDescriptor::new("echo", ValueType::Bool, move |_, args| {
                Ok(Value::Bool(args[0] == Value::Int(n)))
            })
            .param(ParamDescriptor::input("value", ValueType::Int)),
        ));
        let owner = Object::new("Probe").with("amount", n);
        let value = Value::Int(n);
        let target = ConditionTarget { owner: &owner, value: &value, declared: Some(&ValueType::Int) };
        let eval = ConditionEvaluator::new(&types).evaluate(&ConditionAnnotation::new("echo"), &target);
        prop_assert!(eval.is_valid());
    }
}

#[test]
fn test_method_sees_five() {
    let types = TypeRegistry::new().with(TypeDescriptor::new("Probe").method(
        MethodDescriptor::new("is_five", ValueType::Bool, |_, args| {
            Ok(Value::Bool(args[0] == Value::Int(5)))
        })
        .param(ParamDescriptor::input("current", ValueType::Int)),
    ));
    let owner = Object::new("Probe").with("amount", 5);
    let value = Value::Int(5);
    let target = ConditionTarget {
        owner: &owner,
        value: &value,
        declared: None,
    };
    let eval =
        ConditionEvaluator::new(&types).evaluate(&ConditionAnnotation::new("is_five"), &target);
    assert!(eval.is_valid());
}
