use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::operation::{
    BRANCH_FIELD, COMMENT_ID_FIELD, DestructiveOperation, FILE_PATHS_FIELD, FieldKind, REPO_FIELD,
};
use crate::error::ConfirmationError;

/// Value of a single confirmation field
///
/// Serialized untagged: scalars as JSON strings, sets as sorted JSON arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(String),
    Set(BTreeSet<String>),
}

impl ParamValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            ParamValue::Scalar(_) => FieldKind::Scalar,
            ParamValue::Set(_) => FieldKind::Set,
        }
    }

    /// Builds a set value; ordering and duplicates of the input are irrelevant
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Set(values.into_iter().map(Into::into).collect())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

/// Canonical parameters of a destructive request
///
/// Keys are kept sorted and set values are ordered sets, so two logically
/// identical requests always compare equal and serialize to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmationParams(BTreeMap<String, ParamValue>);

impl ConfirmationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    fn scalar(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(ParamValue::Scalar(value)) => value,
            _ => "",
        }
    }

    fn set_values(&self, name: &str) -> Vec<&str> {
        match self.0.get(name) {
            Some(ParamValue::Set(values)) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// The identity of a pending destructive action
///
/// Holds exactly the fields declared by the operation, nothing more and
/// nothing less. Build one through the typed constructors, or through
/// [`ConfirmationRequest::new`] which checks the field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    operation: DestructiveOperation,
    params: ConfirmationParams,
}

impl ConfirmationRequest {
    /// Creates a request after checking `params` against the operation's fields
    pub fn new(
        operation: DestructiveOperation,
        params: ConfirmationParams,
    ) -> Result<Self, ConfirmationError> {
        let expected: Vec<&str> = operation.fields().iter().map(|f| f.name).collect();
        let mut expected_sorted = expected.clone();
        expected_sorted.sort_unstable();
        let actual: Vec<&str> = params.0.keys().map(String::as_str).collect();

        if actual != expected_sorted {
            return Err(ConfirmationError::UnexpectedParameters {
                operation,
                expected: expected.join(", "),
                actual: actual.join(", "),
            });
        }

        for spec in operation.fields() {
            if let Some(value) = params.get(spec.name) {
                if value.kind() != spec.kind {
                    return Err(ConfirmationError::WrongParameterKind {
                        operation,
                        field: spec.name.to_string(),
                        expected: spec.kind.as_str(),
                    });
                }
            }
        }

        Ok(Self { operation, params })
    }

    pub fn delete_branch(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            operation: DestructiveOperation::DeleteBranch,
            params: ConfirmationParams::new()
                .with(REPO_FIELD, repo.into())
                .with(BRANCH_FIELD, branch.into()),
        }
    }

    pub fn delete_files<I, S>(repo: impl Into<String>, branch: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation: DestructiveOperation::DeleteFiles,
            params: ConfirmationParams::new()
                .with(REPO_FIELD, repo.into())
                .with(BRANCH_FIELD, branch.into())
                .with(FILE_PATHS_FIELD, ParamValue::set(paths)),
        }
    }

    pub fn delete_repository(repo: impl Into<String>) -> Self {
        Self {
            operation: DestructiveOperation::DeleteRepository,
            params: ConfirmationParams::new().with(REPO_FIELD, repo.into()),
        }
    }

    pub fn delete_issue_comment(repo: impl Into<String>, comment_id: u64) -> Self {
        Self {
            operation: DestructiveOperation::DeleteIssueComment,
            params: ConfirmationParams::new()
                .with(REPO_FIELD, repo.into())
                .with(COMMENT_ID_FIELD, comment_id.to_string()),
        }
    }

    pub fn operation(&self) -> DestructiveOperation {
        self.operation
    }

    pub fn params(&self) -> &ConfirmationParams {
        &self.params
    }

    /// Human-readable prompt describing what will be deleted
    pub fn summary(&self) -> String {
        let target = match self.operation {
            DestructiveOperation::DeleteBranch => format!(
                "delete branch '{}' in repository '{}'",
                self.params.scalar(BRANCH_FIELD),
                self.params.scalar(REPO_FIELD)
            ),
            DestructiveOperation::DeleteFiles => format!(
                "delete files [{}] on branch '{}' in repository '{}'",
                self.params.set_values(FILE_PATHS_FIELD).join(", "),
                self.params.scalar(BRANCH_FIELD),
                self.params.scalar(REPO_FIELD)
            ),
            DestructiveOperation::DeleteRepository => format!(
                "delete repository '{}'",
                self.params.scalar(REPO_FIELD)
            ),
            DestructiveOperation::DeleteIssueComment => format!(
                "delete comment ID {} in repository '{}'",
                self.params.scalar(COMMENT_ID_FIELD),
                self.params.scalar(REPO_FIELD)
            ),
        };

        format!(
            "Confirmation required to {}. Once confirmed, use the given confirmation_token with the same request parameters.",
            target
        )
    }
}
