pub mod action;
pub mod admin_action;
pub mod timelock_action;
