pub mod editor;
pub mod export;
pub mod gesture;
pub mod input;
pub mod shortcuts;

pub use editor::{MapEditor, MapMutation};
pub use export::{ExportJob, ExportSession};
pub use gesture::{DragGesture, EditorAction};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
