use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::notificationmodel::Notification;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationDto {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "Body is required"))]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNotificationDto {
    pub id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    // unix millis
    pub timestamp: i64,
}

impl FilterNotificationDto {
    pub fn filter_notification(notification: &Notification) -> Self {
        FilterNotificationDto {
            id: notification.message_id.to_owned(),
            title: notification.title.to_owned(),
            body: notification.body.to_owned(),
            read: notification.read,
            timestamp: notification.created_at.timestamp_millis(),
        }
    }

    pub fn filter_notifications(notifications: &[Notification]) -> Vec<FilterNotificationDto> {
        notifications
            .iter()
            .map(FilterNotificationDto::filter_notification)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationListResponseDto {
    pub status: String,
    pub results: usize,
    pub notifications: Vec<FilterNotificationDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationData {
    pub notification: FilterNotificationDto,
}
