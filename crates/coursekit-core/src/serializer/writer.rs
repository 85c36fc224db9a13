//! Write path: validate a payload against an entity and stage the changes.
//!
//! The input entity is never touched. On success the caller receives a staged
//! copy to persist; on failure it receives every field error at once.

use serde_json::{Map, Value};

use super::selector::FieldSelector;
use super::validation::{self, FieldResult, ValidationErrors};

/// An entity whose attributes can be written from an input mapping.
pub trait Writable: Clone {
    /// Attributes a payload may set.
    const WRITABLE: &'static [&'static str];

    /// Attributes a full (non-partial) write must supply.
    const REQUIRED: &'static [&'static str] = &[];

    /// Validate and apply one attribute. Only called with names from `WRITABLE`.
    fn write_field(&mut self, name: &str, value: &Value) -> FieldResult<()>;

    /// Entity-level checks, run once every field passed.
    fn check(&self, _errors: &mut ValidationErrors) {}
}

/// Applies payloads through a selector (the handler decides which fields are writable
/// for the request, on top of what the entity allows).
#[derive(Debug, Clone, Default)]
pub struct FieldWriter {
    selector: FieldSelector,
}

impl FieldWriter {
    pub fn new(selector: FieldSelector) -> Self {
        Self { selector }
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FieldSelector::only(names))
    }

    /// Validate `payload` and return the updated copy of `entity`.
    ///
    /// - keys outside `WRITABLE ∩ selector` are ignored
    /// - `partial == false`: missing `REQUIRED` fields are errors
    /// - any error: nothing is applied
    pub fn apply<E: Writable>(
        &self,
        entity: &E,
        payload: &Map<String, Value>,
        partial: bool,
    ) -> Result<E, ValidationErrors> {
        let mut staged = entity.clone();
        let mut errors = ValidationErrors::new();

        for &field in E::WRITABLE.iter().filter(|f| self.selector.contains(f)) {
            match payload.get(field) {
                Some(value) => {
                    errors.check(field, staged.write_field(field, value));
                }
                None if !partial && E::REQUIRED.contains(&field) => {
                    errors.add(field, validation::REQUIRED);
                }
                None => {}
            }
        }

        if errors.is_empty() {
            staged.check(&mut errors);
        }
        errors.into_result(staged)
    }
}
