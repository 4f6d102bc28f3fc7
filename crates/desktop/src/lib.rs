//! `vacation-desktop`
//!
//! **Responsibility:** Thin UI shell over the vacation inventory.
//!
//! This crate provides:
//! - Serializable command functions a frontend can call
//! - Form and view DTOs for items
//!
//! All state lives in the inventory view-model; the shell only translates.

pub mod commands;

pub use commands::{
    AppState, CommandError, ItemForm, ItemView, add_item, delete_item, edit_item, item_details,
    list_items,
};
