use serde::Deserialize;
use serde_json::{Map, Value};

use hireboard_core::{NewOrganization, NewPosting, PartialUpdate, SqlValue};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewOrganizationRequest {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

impl NewOrganizationRequest {
    pub fn validate(self) -> Result<NewOrganization, Vec<String>> {
        let mut errors = Vec::new();
        check_handle(&self.handle, &mut errors);
        check_non_empty("name", &self.name, &mut errors);
        if let Some(n) = self.num_employees {
            check_count("numEmployees", n, &mut errors);
        }
        if let Some(url) = &self.logo_url {
            check_url("logoUrl", url, &mut errors);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewOrganization {
            handle: self.handle,
            name: self.name,
            description: self.description,
            num_employees: self.num_employees,
            logo_url: self.logo_url,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPostingRequest {
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub organization_handle: String,
}

impl NewPostingRequest {
    pub fn validate(self) -> Result<NewPosting, Vec<String>> {
        let mut errors = Vec::new();
        check_non_empty("title", &self.title, &mut errors);
        check_non_empty("organizationHandle", &self.organization_handle, &mut errors);
        if let Some(salary) = self.salary {
            check_count("salary", salary, &mut errors);
        }
        if let Some(equity) = self.equity {
            check_fraction("equity", equity, &mut errors);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewPosting {
            title: self.title,
            salary: self.salary,
            equity: self.equity,
            organization_handle: self.organization_handle,
        })
    }
}

// -------------------------
// Patch bodies
// -------------------------
//
// Known fields are type-checked here. Any other scalar key is passed through
// so the repository can name it as immutable or unknown.

pub fn organization_patch(body: Map<String, Value>) -> Result<PartialUpdate, Vec<String>> {
    patch(body, |field, value, errors| match field {
        "name" => match value.as_str() {
            Some(name) => check_non_empty("name", name, errors),
            None => errors.push("name must be a string".to_string()),
        },
        "description" => {
            if !(value.is_null() || value.is_string()) {
                errors.push("description must be a string or null".to_string());
            }
        }
        "numEmployees" => match value {
            Value::Null => {}
            v => match v.as_i64() {
                Some(n) => check_count("numEmployees", n, errors),
                None => errors.push("numEmployees must be an integer".to_string()),
            },
        },
        "logoUrl" => match value {
            Value::Null => {}
            Value::String(url) => check_url("logoUrl", url, errors),
            _ => errors.push("logoUrl must be a string or null".to_string()),
        },
        _ => {}
    })
}

pub fn posting_patch(body: Map<String, Value>) -> Result<PartialUpdate, Vec<String>> {
    patch(body, |field, value, errors| match field {
        "title" => match value.as_str() {
            Some(title) => check_non_empty("title", title, errors),
            None => errors.push("title must be a string".to_string()),
        },
        "salary" => match value {
            Value::Null => {}
            v => match v.as_i64() {
                Some(n) => check_count("salary", n, errors),
                None => errors.push("salary must be an integer".to_string()),
            },
        },
        "equity" => match value {
            Value::Null => {}
            v => match v.as_f64() {
                Some(equity) => check_fraction("equity", equity, errors),
                None => errors.push("equity must be a number".to_string()),
            },
        },
        _ => {}
    })
}

fn patch(
    body: Map<String, Value>,
    check: impl Fn(&str, &Value, &mut Vec<String>),
) -> Result<PartialUpdate, Vec<String>> {
    let mut errors = Vec::new();
    let mut update = PartialUpdate::new();
    for (field, value) in body {
        check(&field, &value, &mut errors);
        match SqlValue::from_json(&value) {
            Some(v) => update.insert(field, v),
            None => errors.push(format!("{field} must be a scalar value")),
        }
    }
    if errors.is_empty() {
        Ok(update)
    } else {
        Err(errors)
    }
}

// -------------------------
// Field checks
// -------------------------

fn check_handle(handle: &str, errors: &mut Vec<String>) {
    let len = handle.chars().count();
    if !(1..=25).contains(&len) {
        errors.push("handle must be 1 to 25 characters".to_string());
    }
    if handle.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
        errors.push("handle must be lowercase without spaces".to_string());
    }
}

fn check_non_empty(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} must not be empty"));
    }
}

// Counts are stored in `INTEGER` columns.
fn check_count(field: &str, value: i64, errors: &mut Vec<String>) {
    if !(0..=i64::from(i32::MAX)).contains(&value) {
        errors.push(format!("{field} must be between 0 and {}", i32::MAX));
    }
}

fn check_fraction(field: &str, value: f64, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!("{field} must be between 0 and 1"));
    }
}

fn check_url(field: &str, value: &str, errors: &mut Vec<String>) {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    if !rest.is_some_and(|host| !host.is_empty()) {
        errors.push(format!("{field} must be an http(s) URL"));
    }
}
