//! Widget capability trait, the widget list and scripted listeners.

mod core;
mod events;
mod list;

pub use self::core::{Capabilities, HookContext, UpdateContext, Widget, WidgetFlags, WidgetId};
pub use events::{Listener, Listeners, UnknownEvent, WidgetEvent};
pub use list::{Iter, WidgetList};
