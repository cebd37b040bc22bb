pub mod toast;
pub mod webhook;
