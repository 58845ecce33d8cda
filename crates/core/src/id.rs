//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::RepoError;

/// Generated surrogate key of a posting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(i64);

impl PostingId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PostingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PostingId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PostingId> for i64 {
    fn from(value: PostingId) -> Self {
        value.0
    }
}

impl FromStr for PostingId {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| RepoError::invalid_key(format!("posting id must be an integer, got '{s}'")))
    }
}
