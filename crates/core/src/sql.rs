//! Partial-update (`SET` clause) construction.
//!
//! Turns a sparse, insertion-ordered set of field changes into a
//! `"<column>"=$n, ...` fragment and the matching positional parameters.

use crate::error::{RepoError, RepoResult};
use crate::value::{QueryFragment, SqlValue};

/// External (request-facing) field name → storage column name.
///
/// Fields without an entry map to themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldMapping {
    /// Mapping where every field is stored under its own name.
    pub const IDENTITY: FieldMapping = FieldMapping { entries: &[] };

    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(external, _)| *external == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// A sparse set of field changes, kept in insertion order.
///
/// Setting a field twice keeps its original position and the latest value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    fields: Vec<(String, SqlValue)>,
}

impl PartialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for PartialUpdate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut update = Self::new();
        for (field, value) in iter {
            update.insert(field, value);
        }
        update
    }
}

/// Quote a column name as an SQL identifier (embedded quotes are doubled).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the body of a `SET` clause for `update`.
///
/// ```
/// use hireboard_core::{FieldMapping, PartialUpdate, sql_for_partial_update};
///
/// const MAPPING: FieldMapping = FieldMapping::new(&[("firstName", "first_name")]);
/// let update = PartialUpdate::new().set("firstName", "Aliya").set("age", 32_i64);
///
/// let fragment = sql_for_partial_update(&update, &MAPPING).unwrap();
/// assert_eq!(fragment.clause, r#""first_name"=$1, "age"=$2"#);
/// assert_eq!(fragment.params.len(), 2);
/// ```
pub fn sql_for_partial_update(
    update: &PartialUpdate,
    mapping: &FieldMapping,
) -> RepoResult<QueryFragment> {
    if update.is_empty() {
        return Err(RepoError::EmptyInput);
    }

    let mut columns = Vec::with_capacity(update.len());
    let mut params = Vec::with_capacity(update.len());
    for (idx, (field, value)) in update.iter().enumerate() {
        columns.push(format!("{}=${}", quote_ident(mapping.column(field)), idx + 1));
        params.push(value.clone());
    }

    Ok(QueryFragment {
        clause: columns.join(", "),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PEOPLE: FieldMapping = FieldMapping::new(&[("firstName", "first_name")]);

    #[test]
    fn maps_columns_and_numbers_placeholders() {
        let update = PartialUpdate::new().set("firstName", "Aliya").set("age", 32_i64);

        let fragment = sql_for_partial_update(&update, &PEOPLE).unwrap();

        assert_eq!(fragment.clause, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(
            fragment.params,
            vec![SqlValue::Text("Aliya".to_string()), SqlValue::Int(32)]
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = sql_for_partial_update(&PartialUpdate::new(), &PEOPLE).unwrap_err();
        assert_eq!(err, RepoError::EmptyInput);

        let err = sql_for_partial_update(&PartialUpdate::new(), &FieldMapping::IDENTITY).unwrap_err();
        assert_eq!(err, RepoError::EmptyInput);
    }

    #[test]
    fn null_values_are_bound_not_inlined() {
        let update = PartialUpdate::new().set("logoUrl", SqlValue::Null);
        let mapping = FieldMapping::new(&[("logoUrl", "logo_url")]);

        let fragment = sql_for_partial_update(&update, &mapping).unwrap();

        assert_eq!(fragment.clause, r#""logo_url"=$1"#);
        assert_eq!(fragment.params, vec![SqlValue::Null]);
    }

    #[test]
    fn hostile_field_names_stay_inside_the_identifier() {
        let update = PartialUpdate::new().set(r#"name"=1; DROP TABLE x; --"#, "v");

        let fragment = sql_for_partial_update(&update, &FieldMapping::IDENTITY).unwrap();

        assert_eq!(fragment.clause, r#""name""=1; DROP TABLE x; --"=$1"#);
    }

    #[test]
    fn setting_a_field_twice_keeps_first_position() {
        let update = PartialUpdate::new()
            .set("a", 1_i64)
            .set("b", 2_i64)
            .set("a", 3_i64);

        let fragment = sql_for_partial_update(&update, &FieldMapping::IDENTITY).unwrap();

        assert_eq!(fragment.clause, r#""a"=$1, "b"=$2"#);
        assert_eq!(fragment.params, vec![SqlValue::Int(3), SqlValue::Int(2)]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: one placeholder per field, numbered 1..=n in field order,
        /// with parameters equal to the input values in the same order.
        #[test]
        fn placeholders_align_with_params(
            fields in prop::collection::btree_map("[a-zA-Z_]{1,12}", any::<i64>(), 1..16)
        ) {
            let update: PartialUpdate = fields.iter().map(|(k, v)| (k.clone(), *v)).collect();

            let fragment = sql_for_partial_update(&update, &PEOPLE).unwrap();

            let expected: Vec<usize> = (1..=fields.len()).collect();
            prop_assert_eq!(fragment.placeholders(), expected);
            let values: Vec<SqlValue> = fields.values().map(|v| SqlValue::Int(*v)).collect();
            prop_assert_eq!(fragment.params, values);
        }
    }
}
