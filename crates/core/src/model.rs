//! Canonical records as returned by the repositories.
//!
//! Field names serialize in camelCase, matching the request-facing names the
//! repositories map onto storage columns.

use serde::{Deserialize, Serialize};

use crate::id::PostingId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

/// An organization together with the postings that reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: Organization,
    pub postings: Vec<Posting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub id: PostingId,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub organization_handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosting {
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub organization_handle: String,
}
