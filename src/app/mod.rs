mod state;
mod view;

pub use state::{App, InputField, InputMode};
pub use view::TuiView;
