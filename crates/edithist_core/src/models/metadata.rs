//! Authoring-environment metadata attached to a workspace history.
//!
//! Reconstruction never reads these values; they travel with the history so a
//! reloaded log still says where it was recorded.

use serde::{Deserialize, Serialize};

/// Where a change log was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeMetadata {
    Local(LocalMetadata),
    Git(GitMetadata),
}

impl ChangeMetadata {
    pub fn workspace_name(&self) -> &str {
        match self {
            Self::Local(local) => &local.workspace_name,
            Self::Git(git) => &git.workspace_name,
        }
    }

    pub fn hostname(&self) -> &str {
        match self {
            Self::Local(local) => &local.hostname,
            Self::Git(git) => &git.hostname,
        }
    }
}

/// Plain workspace without version control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalMetadata {
    pub hostname: String,
    pub os_username: String,
    pub workspace_name: String,
}

/// Workspace inside a git checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitMetadata {
    pub hostname: String,
    pub os_username: String,
    pub workspace_name: String,
    pub head: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tag: Option<String>,
    #[serde(default)]
    pub remotes: Vec<GitRemote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRemote {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,
}
