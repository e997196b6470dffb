use serde::{Deserialize, Serialize};

use crate::extract::{extract, IdentifierCategory};
use crate::record::{ItemKind, VideoRecord};

/// Profile seed derived from the first channel in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl TargetInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

pub fn extract_target_info(records: &[VideoRecord]) -> TargetInfo {
    let Some(channel) = records
        .iter()
        .find(|record| matches!(record.kind, ItemKind::Channel))
    else {
        return TargetInfo::default();
    };

    let identifiers = extract(&channel.description);
    TargetInfo {
        name: Some(channel.title.clone()),
        username: Some(channel.title.to_lowercase().replace(' ', "_")),
        email: identifiers
            .first(IdentifierCategory::Email)
            .map(str::to_string),
        phone: identifiers
            .first(IdentifierCategory::Phone)
            .map(str::to_string),
    }
}
