//! Document payload handled by the document pipeline participant.

use serde::{Deserialize, Serialize};

use crate::error::{PayloadError, Result};

/// A versioned text document belonging to a project.
///
/// Every field is optional on the wire: participants may forward a document
/// before it has been persisted or named. Absent fields are omitted on
/// re-encode, so absent and default values stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Increases monotonically per `document_id`; absent means unversioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Document {
    /// Creates the first version of a document.
    pub fn new(
        project_id: i64,
        document_id: i64,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            project_id: Some(project_id),
            document_id: Some(document_id),
            name: Some(name.into()),
            version: Some(1),
            text: Some(text.into()),
        }
    }

    /// Returns the next version of this document carrying `text`.
    ///
    /// An unversioned document becomes version 1.
    pub fn revise(&self, text: impl Into<String>) -> Result<Self> {
        let version = self
            .version
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(PayloadError::VersionOverflow {
                document_id: self.document_id,
            })?;
        Ok(Self {
            version: Some(version),
            text: Some(text.into()),
            ..self.clone()
        })
    }

    /// Rejects a name that is present but blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(PayloadError::MissingField("name"));
        }
        Ok(())
    }
}
