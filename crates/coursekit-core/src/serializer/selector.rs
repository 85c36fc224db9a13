//! FieldSelector / FieldMask - 呼び出し側が指定する出力フィールドの許可リスト
//!
//! # 学習ポイント
//! - 宣言済みフィールド（`Shape::FIELDS`、静的）と許可リスト（実行時）の積集合
//! - 出力順は常に宣言順（許可リストの順序は関係ない）
//! - 関連エンティティごとにネストしたマスクを持てる

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::shape::{Projection, SerializeContext, Shape};

/// Set of attribute names the caller wants in the output.
///
/// Names not declared by the entity are silently ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelector {
    /// No selector given: every declared attribute.
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl FieldSelector {
    pub fn all() -> Self {
        Self::All
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(name),
        }
    }

    /// declared ∩ selector, in declared order.
    pub fn intersect(&self, declared: &'static [&'static str]) -> Vec<&'static str> {
        declared
            .iter()
            .copied()
            .filter(|name| self.contains(name))
            .collect()
    }
}

impl<S: Into<String>> From<Option<Vec<S>>> for FieldSelector {
    fn from(names: Option<Vec<S>>) -> Self {
        names.map_or(Self::All, Self::only)
    }
}

/// A selector plus optional masks for related entities.
///
/// ```ignore
/// let mask = FieldMask::only(["title", "instructor"])
///     .with_nested("instructor", FieldMask::only(["name"]));
/// let out = mask.serialize(&course_view, &ctx);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    selector: FieldSelector,
    nested: BTreeMap<String, FieldMask>,
}

impl FieldMask {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_selector(FieldSelector::only(names))
    }

    pub fn from_selector(selector: FieldSelector) -> Self {
        Self {
            selector,
            nested: BTreeMap::new(),
        }
    }

    /// Override the mask used when rendering `relation`.
    pub fn with_nested(mut self, relation: impl Into<String>, mask: FieldMask) -> Self {
        self.nested.insert(relation.into(), mask);
        self
    }

    pub fn selector(&self) -> &FieldSelector {
        &self.selector
    }

    pub fn nested(&self, relation: &str) -> Option<&FieldMask> {
        self.nested.get(relation)
    }

    /// The attributes of `E` this mask lets through.
    pub fn fields<E: Shape>(&self) -> Vec<&'static str> {
        self.selector.intersect(E::FIELDS)
    }

    /// Read path: project one entity into an ordered mapping.
    pub fn serialize<E: Shape>(&self, entity: &E, ctx: &SerializeContext) -> Map<String, Value> {
        let projection = Projection::new(self, ctx, E::nested_mask);
        self.fields::<E>()
            .into_iter()
            .map(|name| (name.to_string(), entity.field(name, &projection)))
            .collect()
    }

    /// Read path for collections: each element filtered independently, input order kept.
    pub fn serialize_many<'e, E, I>(&self, entities: I, ctx: &SerializeContext) -> Vec<Value>
    where
        E: Shape + 'e,
        I: IntoIterator<Item = &'e E>,
    {
        entities
            .into_iter()
            .map(|entity| Value::Object(self.serialize(entity, ctx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal entity with attributes {id, name, email, bio}.
    struct Person {
        id: u32,
        name: &'static str,
        email: &'static str,
        bio: Option<&'static str>,
    }

    impl Shape for Person {
        const FIELDS: &'static [&'static str] = &["id", "name", "email", "bio"];

        fn field(&self, name: &str, _p: &Projection<'_>) -> Value {
            match name {
                "id" => json!(self.id),
                "name" => json!(self.name),
                "email" => json!(self.email),
                "bio" => json!(self.bio),
                _ => Value::Null,
            }
        }
    }

    fn ada() -> Person {
        Person {
            id: 1,
            name: "Ada",
            email: "ada@example.com",
            bio: Some("analyst"),
        }
    }

    fn ctx() -> SerializeContext {
        SerializeContext::new("http://127.0.0.1:8013")
    }

    #[test]
    fn selector_keeps_only_requested_fields() {
        let out = FieldMask::only(["name", "email"]).serialize(&ada(), &ctx());
        assert_eq!(
            Value::Object(out),
            json!({"name": "Ada", "email": "ada@example.com"})
        );
    }

    #[test]
    fn no_selector_yields_every_declared_field() {
        let out = FieldMask::all().serialize(&ada(), &ctx());
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, Person::FIELDS);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let out = FieldMask::only(["bio", "password", "nope"]).serialize(&ada(), &ctx());
        assert_eq!(Value::Object(out), json!({"bio": "analyst"}));
    }

    #[test]
    fn output_follows_declared_order_not_selector_order() {
        let mask = FieldMask::only(["email", "id"]);
        assert_eq!(mask.fields::<Person>(), vec!["id", "email"]);
    }

    #[test]
    fn collections_are_filtered_per_element_in_order() {
        let grace = Person {
            id: 2,
            name: "Grace",
            email: "grace@example.com",
            bio: None,
        };
        let people = [ada(), grace];

        let out = FieldMask::only(["id", "name"]).serialize_many(&people, &ctx());
        assert_eq!(
            out,
            vec![json!({"id": 1, "name": "Ada"}), json!({"id": 2, "name": "Grace"})]
        );
    }

    #[test]
    fn selector_from_option() {
        assert_eq!(FieldSelector::from(None::<Vec<String>>), FieldSelector::All);
        let only = FieldSelector::from(Some(vec!["name"]));
        assert!(only.contains("name"));
        assert!(!only.contains("email"));
    }
}
