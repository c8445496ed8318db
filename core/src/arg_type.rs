//! Argument value types.
//!
//! An [`ArgType`] tells the parser how many values one use of an argument
//! consumes, how many times the argument may be used, and how to turn the
//! collected raw strings into a [`Value`]. Problems with the raw strings are
//! reported through [`TypeErrors`] with an index local to the values handed
//! to [`ArgType::parse`]; the parser maps those indices back onto tokens.
//!
//! Built-in implementations cover the common cases:
//!
//! - [`BoolType`] and [`CounterType`] take no values.
//! - [`IntType`], [`FloatType`], [`StringType`] and [`EnumType`] take one.
//! - [`KeyValueType`] takes one or more `key=value` pairs.
//! - [`TupleOf`] applies another single-value type to a configurable number
//!   of values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{ErrorLevel, Range, Value};

/// A problem found while converting raw strings into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    /// Index into the values passed to [`ArgType::parse`].
    pub value_index: usize,
    pub message: String,
    pub level: ErrorLevel,
}

/// Error-reporting hook handed to [`ArgType::parse`].
#[derive(Debug, Clone, Default)]
pub struct TypeErrors {
    entries: Vec<TypeError>,
}

impl TypeErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, value_index: usize, level: ErrorLevel, message: impl Into<String>) {
        self.entries.push(TypeError {
            value_index,
            message: message.into(),
            level,
        });
    }

    pub fn error(&mut self, value_index: usize, message: impl Into<String>) {
        self.report(value_index, ErrorLevel::Error, message);
    }

    pub fn warning(&mut self, value_index: usize, message: impl Into<String>) {
        self.report(value_index, ErrorLevel::Warning, message);
    }

    pub fn info(&mut self, value_index: usize, message: impl Into<String>) {
        self.report(value_index, ErrorLevel::Info, message);
    }

    /// Moves errors reported by a nested type, shifting their indices by `offset`.
    pub fn absorb(&mut self, nested: TypeErrors, offset: usize) {
        self.entries
            .extend(nested.entries.into_iter().map(|mut e| {
                e.value_index += offset;
                e
            }));
    }

    /// Returns `true` if any reported entry has [`ErrorLevel::Error`].
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == ErrorLevel::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeError> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<TypeError> {
        self.entries
    }
}

/// Capability set of an argument's value type.
///
/// Types are stateless: accumulated state (a counter's running total, for
/// instance) is passed back in as `previous` on every use.
///
/// # Examples
///
/// ```
/// use argtree_core::{ArgType, IntType, Range, TypeErrors, Value};
///
/// let int = IntType::new().with_bounds(1, 10);
/// assert_eq!(int.value_count(), Range::ONE);
///
/// let mut errors = TypeErrors::new();
/// assert_eq!(int.parse(&["7".to_string()], None, &mut errors), Some(Value::Int(7)));
/// assert!(errors.is_empty());
///
/// assert_eq!(int.parse(&["70".to_string()], None, &mut errors), None);
/// assert!(errors.has_errors());
/// ```
pub trait ArgType: fmt::Debug {
    /// How many values one use of the argument consumes.
    fn value_count(&self) -> Range {
        Range::ONE
    }

    /// How many times the argument may be used.
    fn usage_count(&self) -> Range {
        Range::ONE
    }

    /// Value held before the argument is ever used.
    fn initial_value(&self) -> Option<Value> {
        None
    }

    fn description(&self) -> Option<String> {
        None
    }

    /// Converts the raw values of one use into a value.
    ///
    /// Returning `None` keeps whatever value the argument held before.
    fn parse(
        &self,
        values: &[String],
        previous: Option<&Value>,
        errors: &mut TypeErrors,
    ) -> Option<Value>;
}

/// Flag that becomes `true` when used.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl ArgType for BoolType {
    fn value_count(&self) -> Range {
        Range::NONE
    }

    fn initial_value(&self) -> Option<Value> {
        Some(Value::Bool(false))
    }

    fn parse(&self, _: &[String], _: Option<&Value>, _: &mut TypeErrors) -> Option<Value> {
        Some(Value::Bool(true))
    }
}

/// Flag counting how many times it was used (`-vvv` gives 3).
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterType;

impl ArgType for CounterType {
    fn value_count(&self) -> Range {
        Range::NONE
    }

    fn usage_count(&self) -> Range {
        Range::ANY
    }

    fn initial_value(&self) -> Option<Value> {
        Some(Value::Int(0))
    }

    fn parse(&self, _: &[String], previous: Option<&Value>, _: &mut TypeErrors) -> Option<Value> {
        let count = previous.and_then(Value::as_int).unwrap_or(0);
        Some(Value::Int(count + 1))
    }
}

/// Signed integer with optional inclusive bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min.min(max));
        self.max = Some(max.max(min));
        self
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    fn bounds_text(&self) -> Option<String> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(format!("between {min} and {max}")),
            (Some(min), None) => Some(format!("at least {min}")),
            (None, Some(max)) => Some(format!("at most {max}")),
            (None, None) => None,
        }
    }
}

impl ArgType for IntType {
    fn description(&self) -> Option<String> {
        Some(match self.bounds_text() {
            Some(bounds) => format!("An integer {bounds}."),
            None => "An integer.".to_string(),
        })
    }

    fn parse(&self, values: &[String], _: Option<&Value>, errors: &mut TypeErrors) -> Option<Value> {
        let n = parse_number::<i64>(values.first()?, "integer", errors)?;
        let below = self.min.is_some_and(|min| n < min);
        let above = self.max.is_some_and(|max| n > max);
        if below || above {
            let bounds = self.bounds_text().unwrap_or_default();
            errors.error(0, format!("Value {n} is out of range. Expected a value {bounds}."));
            return None;
        }
        Some(Value::Int(n))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl ArgType for FloatType {
    fn description(&self) -> Option<String> {
        Some("A floating point number.".to_string())
    }

    fn parse(&self, values: &[String], _: Option<&Value>, errors: &mut TypeErrors) -> Option<Value> {
        let raw = values.first()?;
        parse_number::<f64>(raw, "float", errors).map(Value::Float)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ArgType for StringType {
    fn parse(&self, values: &[String], _: Option<&Value>, _: &mut TypeErrors) -> Option<Value> {
        values.first().map(|v| Value::Str(v.clone()))
    }
}

/// One of a fixed set of variants, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct EnumType {
    variants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

impl ArgType for EnumType {
    fn description(&self) -> Option<String> {
        Some(format!("One of: {}.", self.variants.join(", ")))
    }

    fn parse(&self, values: &[String], _: Option<&Value>, errors: &mut TypeErrors) -> Option<Value> {
        let raw = values.first()?;
        match self
            .variants
            .iter()
            .find(|variant| variant.eq_ignore_ascii_case(raw))
        {
            Some(variant) => Some(Value::Str(variant.clone())),
            None => {
                errors.error(
                    0,
                    format!(
                        "Invalid value '{raw}'. Expected one of: {}.",
                        self.variants.join(", ")
                    ),
                );
                None
            }
        }
    }
}

/// One or more `key=value` pairs collected into a map.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueType;

impl ArgType for KeyValueType {
    fn value_count(&self) -> Range {
        Range::AT_LEAST_ONE
    }

    fn description(&self) -> Option<String> {
        Some("Pairs of the form key=value.".to_string())
    }

    fn parse(&self, values: &[String], _: Option<&Value>, errors: &mut TypeErrors) -> Option<Value> {
        let mut map = BTreeMap::new();
        for (index, raw) in values.iter().enumerate() {
            match raw.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    if map
                        .insert(key.trim().to_string(), Value::Str(value.to_string()))
                        .is_some()
                    {
                        errors.warning(index, format!("Key '{}' was given more than once.", key.trim()));
                    }
                }
                _ => errors.error(
                    index,
                    format!("Invalid key-value pair '{raw}'. Expected 'key=value'."),
                ),
            }
        }
        if errors.has_errors() {
            return None;
        }
        Some(Value::Map(map))
    }
}

/// Several values, each converted by a single-value inner type.
#[derive(Debug)]
pub struct TupleOf {
    inner: Box<dyn ArgType>,
    count: Range,
}

impl TupleOf {
    pub fn new(inner: impl ArgType + 'static, count: Range) -> Self {
        Self {
            inner: Box::new(inner),
            count,
        }
    }

    pub fn boxed(inner: Box<dyn ArgType>, count: Range) -> Self {
        Self { inner, count }
    }
}

impl ArgType for TupleOf {
    fn value_count(&self) -> Range {
        self.count
    }

    fn description(&self) -> Option<String> {
        let count = self.count.describe("value");
        Some(match self.inner.description() {
            Some(inner) => format!("{count}, each: {inner}"),
            None => count,
        })
    }

    fn parse(&self, values: &[String], _: Option<&Value>, errors: &mut TypeErrors) -> Option<Value> {
        let mut items = Vec::with_capacity(values.len());
        let mut failed = false;
        for (index, raw) in values.iter().enumerate() {
            let mut nested = TypeErrors::new();
            match self
                .inner
                .parse(std::slice::from_ref(raw), None, &mut nested)
            {
                Some(value) => items.push(value),
                None => failed = true,
            }
            errors.absorb(nested, index);
        }
        if failed || errors.has_errors() {
            return None;
        }
        Some(Value::List(items))
    }
}

fn parse_number<T: FromStr>(raw: &str, what: &str, errors: &mut TypeErrors) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.error(0, format!("Invalid {what} value: '{raw}'."));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_counter_accumulates_previous() {
        let mut errors = TypeErrors::new();
        let first = CounterType.parse(&[], None, &mut errors);
        let second = CounterType.parse(&[], first.as_ref(), &mut errors);
        assert_eq!(second, Some(Value::Int(2)));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let mut errors = TypeErrors::new();
        assert_eq!(IntType::new().parse(&strings(&["x1"]), None, &mut errors), None);
        let reported: Vec<_> = errors.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].message, "Invalid integer value: 'x1'.");
    }

    #[test]
    fn test_enum_matches_case_insensitively() {
        let ty = EnumType::new(["Json", "Yaml"]);
        let mut errors = TypeErrors::new();
        assert_eq!(
            ty.parse(&strings(&["yaml"]), None, &mut errors),
            Some(Value::from("Yaml"))
        );
        assert_eq!(ty.parse(&strings(&["toml"]), None, &mut errors), None);
        assert!(errors.has_errors());
    }

    #[test]
    fn test_key_value_reports_index_of_bad_pair() {
        let mut errors = TypeErrors::new();
        let result = KeyValueType.parse(&strings(&["a=1", "broken"]), None, &mut errors);
        assert_eq!(result, None);
        assert_eq!(errors.iter().next().map(|e| e.value_index), Some(1));
    }

    #[test]
    fn test_tuple_of_reanchors_inner_errors() {
        let ty = TupleOf::new(IntType::new(), Range::between(1, 3));
        let mut errors = TypeErrors::new();
        assert_eq!(ty.parse(&strings(&["1", "two", "3"]), None, &mut errors), None);
        let reported: Vec<_> = errors.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].value_index, 1);

        let mut errors = TypeErrors::new();
        assert_eq!(
            ty.parse(&strings(&["1", "2"]), None, &mut errors),
            Some(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }
}
