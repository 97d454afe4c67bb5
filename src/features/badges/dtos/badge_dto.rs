use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::badges::BadgeDefinition;

/// Public description of a badge
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BadgeDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: i32,
}

impl From<&BadgeDefinition> for BadgeDto {
    fn from(b: &BadgeDefinition) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name.to_string(),
            description: b.description.to_string(),
            icon: b.icon.to_string(),
            points: b.points,
        }
    }
}
