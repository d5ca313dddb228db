// Application layer: CQRS buses, handlers, validation and the editing workflow
pub mod command_bus;
pub mod command_handlers;
pub mod commands;
pub mod editing;
pub mod events;
pub mod queries;
pub mod query_bus;
pub mod query_handlers;
pub mod validators;
