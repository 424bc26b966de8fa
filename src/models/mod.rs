pub mod matchmodel;
pub mod notificationmodel;
pub mod reviewmodel;
pub mod skillmodel;
pub mod usermodel;
