//! Deferred filter predicates and the rules for merging them.
//!
//! [`Conditionals`] is a tree of comparisons joined by a single [`Logic`]
//! combinator. Raw caller filters (a JSON object) are interpreted through a
//! [`ParamLogic`], which decides between `LIKE` and exact matching and which
//! keys to skip. Nothing here touches the database; SQL rendering lives in
//! [`crate::db::records`].

use super::error::FieldErrors;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn parse(value: &str) -> Option<Logic> {
        match value.to_ascii_lowercase().as_str() {
            "and" => Some(Logic::And),
            "or" => Some(Logic::Or),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    NotIn,
    Null,
    NotNull,
}

impl Operator {
    pub fn parse(value: &str) -> Option<Operator> {
        let op = match value.to_ascii_lowercase().as_str() {
            "=" | "eq" => Operator::Eq,
            "!=" | "<>" | "ne" => Operator::Ne,
            ">" | "gt" => Operator::Gt,
            ">=" | "gte" => Operator::Gte,
            "<" | "lt" => Operator::Lt,
            "<=" | "lte" => Operator::Lte,
            "like" => Operator::Like,
            "in" => Operator::In,
            "not_in" | "not in" => Operator::NotIn,
            "null" | "is_null" => Operator::Null,
            "not_null" | "is_not_null" => Operator::NotNull,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare { field: String, op: Operator, value: Value },
    Group(Conditionals),
}

/// A set of predicates joined by one combinator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditionals {
    logic: Logic,
    predicates: Vec<Predicate>,
}

impl Conditionals {
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            predicates: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(Logic::And)
    }

    pub fn or() -> Self {
        Self::new(Logic::Or)
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(field, Operator::Eq, value)
    }

    pub fn where_op(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_group(mut self, group: Conditionals) -> Self {
        if !group.is_empty() {
            self.predicates.push(Predicate::Group(group));
        }
        self
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Combines two predicate sets under `logic` without mutating either.
    ///
    /// Operands that already use `logic` (or hold a single predicate) are
    /// inlined, anything else is nested as a group. That keeps
    /// `a.merge(b).merge(c)` structurally equal to `a.merge(b.merge(c))`.
    pub fn merge(&self, other: &Conditionals, logic: Logic) -> Conditionals {
        let mut predicates = Vec::with_capacity(self.predicates.len() + other.predicates.len());
        self.flatten_into(logic, &mut predicates);
        other.flatten_into(logic, &mut predicates);
        Conditionals { logic, predicates }
    }

    fn flatten_into(&self, logic: Logic, out: &mut Vec<Predicate>) {
        if self.logic == logic || self.predicates.len() <= 1 {
            out.extend(self.predicates.iter().cloned());
        } else {
            out.push(Predicate::Group(self.clone()));
        }
    }

    /// Field names referenced anywhere in the tree.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        for predicate in &self.predicates {
            match predicate {
                Predicate::Compare { field, .. } => fields.push(field.as_str()),
                Predicate::Group(group) => fields.extend(group.fields()),
            }
        }
        fields
    }

    /// Interprets raw caller filters.
    ///
    /// - `null` matches `IS NULL`, arrays match `IN`
    /// - `{"op": ">=", "value": 3}` selects an operator explicitly
    /// - `and` / `or` keys holding an object open a nested group
    /// - strings match with `LIKE %value%` unless the key is exact
    pub fn from_params(params: &Map<String, Value>, logic: &ParamLogic) -> Result<Conditionals, FieldErrors> {
        let mut conditionals = Conditionals::new(logic.logic);
        let mut errors = FieldErrors::new();

        for (key, value) in params {
            if logic.ignores(key) {
                continue;
            }

            if let Some(group_logic) = Logic::parse(key) {
                match value {
                    Value::Object(nested) => {
                        let nested_logic = ParamLogic {
                            logic: group_logic,
                            ..logic.clone()
                        };
                        match Conditionals::from_params(nested, &nested_logic) {
                            Ok(group) => conditionals = conditionals.where_group(group),
                            Err(nested_errors) => errors.extend(nested_errors),
                        }
                    }
                    _ => errors.add(key.as_str(), "must be an object of conditions"),
                }
                continue;
            }

            let (op, value) = match value {
                Value::Null => (Operator::Null, Value::Null),
                Value::Array(_) => (Operator::In, value.clone()),
                Value::Object(operand) => {
                    let op = operand.get("op").or_else(|| operand.get("operator")).and_then(Value::as_str);
                    match op.and_then(Operator::parse) {
                        Some(op) => (op, operand.get("value").cloned().unwrap_or(Value::Null)),
                        None => {
                            errors.add(key.as_str(), "requires a known `op`");
                            continue;
                        }
                    }
                }
                Value::String(text) => {
                    if text.is_empty() && logic.skips_empty() {
                        continue;
                    }
                    if logic.match_value_in_like && !logic.is_exact(key) {
                        (Operator::Like, Value::String(format!("%{}%", escape_like(text))))
                    } else {
                        (Operator::Eq, value.clone())
                    }
                }
                _ => (Operator::Eq, value.clone()),
            };

            conditionals = conditionals.where_op(key.as_str(), op, value);
        }

        if errors.is_empty() {
            Ok(conditionals)
        } else {
            Err(errors)
        }
    }
}

/// Escapes `LIKE` wildcards so `text` matches literally under `ESCAPE '\'`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamOption {
    /// Always compare this key with `=`.
    Exact(String),
    /// Drop this key from raw filters.
    Ignore(String),
    /// Drop keys whose value is an empty string.
    SkipEmpty,
}

/// How raw filter mappings are interpreted and combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLogic {
    pub logic: Logic,
    pub match_value_in_like: bool,
    pub extra_options: Vec<ParamOption>,
}

impl Default for ParamLogic {
    fn default() -> Self {
        Self {
            logic: Logic::And,
            match_value_in_like: true,
            extra_options: Vec::new(),
        }
    }
}

impl ParamLogic {
    pub fn new(logic: Logic, match_value_in_like: bool, extra_options: Vec<ParamOption>) -> Self {
        Self {
            logic,
            match_value_in_like,
            extra_options,
        }
    }

    fn is_exact(&self, key: &str) -> bool {
        key == "id" || key.ends_with("_id") || self.extra_options.iter().any(|option| matches!(option, ParamOption::Exact(field) if field == key))
    }

    fn ignores(&self, key: &str) -> bool {
        self.extra_options.iter().any(|option| matches!(option, ParamOption::Ignore(field) if field == key))
    }

    fn skips_empty(&self) -> bool {
        self.extra_options.contains(&ParamOption::SkipEmpty)
    }
}
