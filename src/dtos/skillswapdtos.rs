use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSwapRequestDto {
    #[validate(length(min = 1, message = "Target user is required"))]
    pub target_user_id: String,

    #[validate(length(min = 1, max = 100, message = "Skill name is required"))]
    pub skill_name: String,
}
