//! First-party modules.

pub mod events;
pub mod object;
pub mod templates;

pub use events::{EventsModule, ListenerId};
pub use object::ObjectModule;
pub use templates::{TemplateEngine, TemplateError, TemplatesModule};
