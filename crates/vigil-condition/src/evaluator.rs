//! Boolean condition evaluation
//!
//! Evaluates a [`ConditionAnnotation`] against the structural parent of the
//! annotated field. Literal `true`/`false` short-circuit; anything else is
//! resolved as a member path and dispatched on the member kind.

use crate::error::{ConditionError, ResolutionError};
use crate::resolver::{ConditionResolver, Member};
use crate::state::{validate_transition, ConditionState};
use std::panic::{catch_unwind, AssertUnwindSafe};
use vigil_model::{
    ConditionAnnotation, MethodDescriptor, Object, ParamKind, Severity, TypeRegistry, Value,
    ValueType,
};

/// Prefix of messages describing a broken condition
pub const MESSAGE_PREFIX: &str = "ValidateInput: ";

/// Maximum number of parameters bound to well-known slots
pub const MAX_SLOT_PARAMS: usize = 3;

/// The annotated field a condition is evaluated for
#[derive(Debug, Clone, Copy)]
pub struct ConditionTarget<'a> {
    /// Structural parent of the field (resolution starts here)
    pub owner: &'a Object,

    /// Current value of the annotated field (or element)
    pub value: &'a Value,

    /// Declared type of the annotated field, when described
    pub declared: Option<&'a ValueType>,
}

impl ConditionTarget<'_> {
    fn value_type(&self) -> ValueType {
        self.declared
            .cloned()
            .unwrap_or_else(|| self.value.value_type())
    }
}

/// Successful evaluation of a resolved condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Condition result
    pub holds: bool,

    /// Message written by a method's output slot
    pub message: Option<String>,

    /// Severity written by a method's output slot
    pub severity: Option<Severity>,
}

impl Verdict {
    fn plain(holds: bool) -> Self {
        Self {
            holds,
            message: None,
            severity: None,
        }
    }
}

/// Final outcome of evaluating one condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    state: ConditionState,
    message: String,
    severity: Severity,
}

impl Evaluation {
    /// Terminal state reached
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConditionState {
        self.state
    }

    /// Check if the condition holds
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state == ConditionState::Valid
    }

    /// Message for the record (meaningless when valid)
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity for the record; always Error when resolution failed
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Literal condition value, if `condition` is `true` or `false` in any case
#[must_use]
pub fn literal(condition: &str) -> Option<bool> {
    let condition = condition.trim();
    if condition.eq_ignore_ascii_case("true") {
        Some(true)
    } else if condition.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Evaluates condition annotations
#[derive(Debug, Clone, Copy)]
pub struct ConditionEvaluator<'t> {
    resolver: ConditionResolver<'t>,
}

impl<'t> ConditionEvaluator<'t> {
    /// Create evaluator over a type table
    #[inline]
    #[must_use]
    pub fn new(types: &'t TypeRegistry) -> Self {
        Self {
            resolver: ConditionResolver::new(types),
        }
    }

    /// Evaluate an annotation for a field
    #[must_use]
    pub fn evaluate(&self, annotation: &ConditionAnnotation, target: &ConditionTarget<'_>) -> Evaluation {
        let mut state = ConditionState::Unresolved;

        if let Some(holds) = literal(&annotation.condition) {
            let next = if holds {
                ConditionState::Valid
            } else {
                ConditionState::Invalid
            };
            advance(&mut state, next);
            return Evaluation {
                state,
                message: annotation.message.clone(),
                severity: annotation.severity,
            };
        }

        advance(&mut state, ConditionState::Resolving);
        match self.check(annotation, target) {
            Ok(verdict) => {
                advance(
                    &mut state,
                    if verdict.holds {
                        ConditionState::Valid
                    } else {
                        ConditionState::Invalid
                    },
                );
                Evaluation {
                    state,
                    message: verdict
                        .message
                        .unwrap_or_else(|| annotation.message.clone()),
                    severity: verdict.severity.unwrap_or(annotation.severity),
                }
            }
            Err(err) => {
                advance(&mut state, ConditionState::ResolutionFailed);
                Evaluation {
                    state,
                    message: format!("{MESSAGE_PREFIX}{err}"),
                    severity: Severity::Error,
                }
            }
        }
    }

    /// Resolve and run a non-literal condition
    ///
    /// # Errors
    /// Returns [`ConditionError`] on resolution, type, binding or invocation failure
    pub fn check(
        &self,
        annotation: &ConditionAnnotation,
        target: &ConditionTarget<'_>,
    ) -> Result<Verdict, ConditionError> {
        let resolution = self.resolver.resolve(&annotation.condition, target.owner)?;
        let owner: &Object = &resolution.owner;

        match resolution.member {
            Member::Field {
                name,
                value,
                declared,
            } => {
                if declared.is_some_and(|t| *t != ValueType::Bool) {
                    return Err(ConditionError::NotBoolean { member: name });
                }
                value
                    .as_bool()
                    .map(Verdict::plain)
                    .ok_or(ConditionError::NotBoolean { member: name })
            }
            Member::Static { name, value } => value
                .as_bool()
                .map(Verdict::plain)
                .ok_or(ConditionError::NotBoolean { member: name }),
            Member::Property(p) => {
                let not_boolean = || ConditionError::NotBoolean {
                    member: p.name().to_string(),
                };
                if *p.ty() != ValueType::Bool {
                    return Err(not_boolean());
                }
                p.get(owner).as_bool().map(Verdict::plain).ok_or_else(not_boolean)
            }
            Member::Method(m) => invoke(m, owner, annotation, target),
        }
    }
}

fn advance(state: &mut ConditionState, next: ConditionState) {
    if let Err(err) = validate_transition(*state, next) {
        tracing::warn!(%err, "condition state machine rejected transition");
        return;
    }
    tracing::trace!(from = ?*state, to = ?next, "condition state");
    *state = next;
}

/// Bound arguments plus the positions of the output slots
struct Binding {
    args: Vec<Value>,
    message_slot: Option<usize>,
    severity_slot: Option<usize>,
}

fn bind(
    method: &MethodDescriptor,
    annotation: &ConditionAnnotation,
    target: &ConditionTarget<'_>,
) -> Result<Binding, ConditionError> {
    let field_type = target.value_type();
    let params = method.params();
    let mut binding = Binding {
        args: Vec::with_capacity(params.len()),
        message_slot: None,
        severity_slot: None,
    };
    let mut field_bound = false;
    // slot matching stops at the first parameter that falls back to its default
    let mut slots_open = true;

    for (i, param) in params.iter().enumerate() {
        if i >= MAX_SLOT_PARAMS || !slots_open {
            let default = param.default_value().ok_or_else(|| {
                ConditionError::TrailingParameterNotOptional {
                    method: method.name().to_string(),
                    param: param.name().to_string(),
                }
            })?;
            binding.args.push(default.clone());
            continue;
        }

        match param.kind() {
            ParamKind::In(ty) if !field_bound && ty.is_assignable_from(&field_type) => {
                binding.args.push(target.value.clone());
                field_bound = true;
            }
            ParamKind::OutMessage if binding.message_slot.is_none() => {
                binding.args.push(Value::Str(annotation.message.clone()));
                binding.message_slot = Some(i);
            }
            ParamKind::OutSeverity if binding.severity_slot.is_none() => {
                binding.args.push(Value::Severity(annotation.severity));
                binding.severity_slot = Some(i);
            }
            _ => {
                let default = param.default_value().ok_or_else(|| {
                    ConditionError::ParameterNotAssignable {
                        method: method.name().to_string(),
                        param: param.name().to_string(),
                    }
                })?;
                binding.args.push(default.clone());
                slots_open = false;
            }
        }
    }
    Ok(binding)
}

fn invoke(
    method: &MethodDescriptor,
    owner: &Object,
    annotation: &ConditionAnnotation,
    target: &ConditionTarget<'_>,
) -> Result<Verdict, ConditionError> {
    let name = method.name().to_string();
    if *method.returns() != ValueType::Bool {
        return Err(ConditionError::NotBoolean { member: name });
    }

    let mut binding = bind(method, annotation, target)?;
    let outcome = catch_unwind(AssertUnwindSafe(|| method.invoke(owner, &mut binding.args)));
    let returned = match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(reason)) => return Err(ConditionError::Invocation { method: name, reason }),
        Err(payload) => {
            return Err(ConditionError::Invocation {
                method: name,
                reason: panic_text(payload.as_ref()),
            })
        }
    };

    let holds = returned
        .as_bool()
        .ok_or(ConditionError::NotBoolean { member: name })?;
    Ok(Verdict {
        holds,
        message: binding
            .message_slot
            .and_then(|i| binding.args[i].as_str())
            .map(str::to_string),
        severity: binding
            .severity_slot
            .and_then(|i| binding.args[i].as_severity()),
    })
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "method panicked".to_string()
    }
}

impl From<ResolutionError> for Evaluation {
    fn from(err: ResolutionError) -> Self {
        Self {
            state: ConditionState::ResolutionFailed,
            message: format!("{MESSAGE_PREFIX}{err}"),
            severity: Severity::Error,
        }
    }
}
