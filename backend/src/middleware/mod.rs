//! Request extractors shared by the handlers

pub mod identity;
pub mod validated_json;

pub use identity::{CurrentUser, USER_ID_HEADER};
pub use validated_json::ValidatedJson;
