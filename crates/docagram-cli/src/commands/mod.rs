//! Command implementations.

pub mod analyze;
pub mod delete;
pub mod diagram;
pub mod entities;
pub mod options;
pub mod select;
pub mod session;
pub mod summarize;

pub use self::analyze::{execute_analyze, read_input, run_analysis, AnalysisOutcome};
pub use self::delete::execute_delete;
pub use self::diagram::{execute_diagram, render_diagram};
pub use self::entities::{execute_entities, execute_relationships};
pub use self::options::execute_options;
pub use self::select::execute_select;
pub use self::session::{execute_export, execute_import, execute_reset};
pub use self::summarize::execute_summarize;
