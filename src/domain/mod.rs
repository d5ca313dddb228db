// Domain layer: aggregates, value objects and the permission matrix model
pub mod access_profile;
pub mod catalog;
pub mod error;
pub mod notification;
pub mod permission;
pub mod permission_matrix;
