//! Search filters and `WHERE` clause construction.
//!
//! Filters are entity-specific; each recognized, present filter contributes
//! one predicate in a fixed order: substring filters, minimum bounds, maximum
//! bounds, then the equity state. Column names are constants in this module
//! and never come from the caller.

use serde::Deserialize;

use crate::error::{RepoError, RepoResult};
use crate::sql::quote_ident;
use crate::value::{QueryFragment, SqlValue};

/// Anything that can render itself as a `WHERE` clause body.
pub trait WhereClause {
    /// Validate and render. An empty fragment means "no constraint".
    fn to_where_clause(&self) -> RepoResult<QueryFragment>;
}

/// Organization search filters (`nameLike`, `minEmployees`, `maxEmployees`).
///
/// Unrecognized keys are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl WhereClause for OrganizationFilter {
    fn to_where_clause(&self) -> RepoResult<QueryFragment> {
        check_non_negative("minEmployees", self.min_employees)?;
        check_non_negative("maxEmployees", self.max_employees)?;
        check_range("employees", self.min_employees, self.max_employees)?;

        let mut predicates = Predicates::default();
        if let Some(name) = non_blank(&self.name_like) {
            predicates.bind("name", "ILIKE", SqlValue::Text(like_pattern(name)));
        }
        if let Some(min) = self.min_employees {
            predicates.bind("num_employees", ">=", SqlValue::Int(min));
        }
        if let Some(max) = self.max_employees {
            predicates.bind("num_employees", "<=", SqlValue::Int(max));
        }
        Ok(predicates.finish())
    }
}

/// Posting search filters (`title`, `minSalary`, `hasEquity`).
///
/// `has_equity` is tri-state: `Some(true)` keeps postings with strictly
/// positive equity, `Some(false)` keeps postings with exactly zero equity,
/// `None` applies no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingFilter {
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
}

impl WhereClause for PostingFilter {
    fn to_where_clause(&self) -> RepoResult<QueryFragment> {
        check_non_negative("minSalary", self.min_salary)?;

        let mut predicates = Predicates::default();
        if let Some(title) = non_blank(&self.title) {
            predicates.bind("title", "ILIKE", SqlValue::Text(like_pattern(title)));
        }
        if let Some(min) = self.min_salary {
            predicates.bind("salary", ">=", SqlValue::Int(min));
        }
        match self.has_equity {
            Some(true) => predicates.constant(format!("{} > 0", quote_ident("equity"))),
            Some(false) => predicates.constant(format!("{} = 0", quote_ident("equity"))),
            None => {}
        }
        Ok(predicates.finish())
    }
}

fn check_non_negative(filter: &'static str, value: Option<i64>) -> RepoResult<()> {
    match value {
        Some(value) if value < 0 => Err(RepoError::NegativeBound { filter, value }),
        _ => Ok(()),
    }
}

fn check_range(dimension: &'static str, min: Option<i64>, max: Option<i64>) -> RepoResult<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(RepoError::InvalidRange { dimension, min, max }),
        _ => Ok(()),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `%value%`, with LIKE metacharacters in `value` matched literally.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[derive(Default)]
struct Predicates {
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl Predicates {
    fn bind(&mut self, column: &'static str, op: &'static str, value: SqlValue) {
        self.params.push(value);
        self.clauses
            .push(format!("{} {} ${}", quote_ident(column), op, self.params.len()));
    }

    fn constant(&mut self, predicate: String) {
        self.clauses.push(predicate);
    }

    fn finish(self) -> QueryFragment {
        QueryFragment {
            clause: self.clauses.join(" AND "),
            params: self.params,
        }
    }
}
