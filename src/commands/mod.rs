//! Tauri commands module
//!
//! This module contains all Tauri commands split into logical submodules:
//! - `views`: navigation between the home view and process forms
//! - `forms`: file picks, submission and revealing saved results

mod forms;
mod views;

// Re-export all commands
pub use forms::*;
pub use views::*;
