use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of value a confirmation field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Compared by exact string equality
    Scalar,
    /// Compared as an unordered set of strings
    Set,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Set => "set",
        }
    }
}

/// A field that must match between mint time and confirm time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn scalar(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Scalar,
    }
}

const fn set(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Set,
    }
}

pub const REPO_FIELD: &str = "repo";
pub const BRANCH_FIELD: &str = "branch";
pub const FILE_PATHS_FIELD: &str = "file_paths";
pub const COMMENT_ID_FIELD: &str = "comment_id";

/// Irreversible operations that must pass through the confirmation gate
///
/// Each operation declares the exact set of fields that identify its target.
/// A token is only valid for a request whose fields all match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DestructiveOperation {
    DeleteBranch,
    DeleteFiles,
    DeleteRepository,
    DeleteIssueComment,
}

impl DestructiveOperation {
    /// The identifying fields of this operation
    pub fn fields(&self) -> &'static [FieldSpec] {
        const DELETE_BRANCH: &[FieldSpec] = &[scalar(REPO_FIELD), scalar(BRANCH_FIELD)];
        const DELETE_FILES: &[FieldSpec] = &[
            scalar(REPO_FIELD),
            scalar(BRANCH_FIELD),
            set(FILE_PATHS_FIELD),
        ];
        const DELETE_REPOSITORY: &[FieldSpec] = &[scalar(REPO_FIELD)];
        const DELETE_ISSUE_COMMENT: &[FieldSpec] =
            &[scalar(REPO_FIELD), scalar(COMMENT_ID_FIELD)];

        match self {
            DestructiveOperation::DeleteBranch => DELETE_BRANCH,
            DestructiveOperation::DeleteFiles => DELETE_FILES,
            DestructiveOperation::DeleteRepository => DELETE_REPOSITORY,
            DestructiveOperation::DeleteIssueComment => DELETE_ISSUE_COMMENT,
        }
    }
}
