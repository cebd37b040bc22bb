pub mod dashboard;
pub mod i18n;
pub mod id;
pub mod types;
