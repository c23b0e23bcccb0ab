//! Message entity and its populated view.

pub mod model;
pub mod view;

pub use model::{DEFAULT_MESSAGE_TYPE, Message, NewMessage};
pub use view::MessageView;
