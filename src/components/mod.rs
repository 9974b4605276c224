pub mod document_view;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use document_view::{document_lines, DocumentView, DocumentViewProps};
