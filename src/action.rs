//! Actions for the terminal host

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Keyboard-driven intents on the page
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Focus category =====
    /// Move focus to the next button (wraps)
    FocusNext,

    /// Move focus to the previous button (wraps)
    FocusPrev,

    // ===== Uncategorized (global) =====
    /// Click the focused button
    Activate,

    /// Exit the application
    Quit,
}
