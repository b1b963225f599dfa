//! Terminal UI for zigup: output formatting, progress display, prompts.

pub mod output;
pub mod prompt;
pub mod spinner;
pub mod style;

pub use output::{Output, Verbosity};
pub use prompt::{Prompter, ScriptedPrompter, StdPrompter};
pub use spinner::{Progress, Spinner};
pub use style::{Style, colors_enabled};
