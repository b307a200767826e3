//! Kinet Widgets
//!
//! Pointer-reactive effects built on `kinet_animation`. Every widget
//! subscribes to a [`WidgetHost`] once at construction, writes to a
//! [`Surface`] from its frame callback only, and detaches on `dispose` or
//! drop.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kinet_core::{EventKind, InputEvent, Rect};
//! use kinet_widgets::{AnimatedLine, LineConfig, RecordingSurface, WidgetHost};
//!
//! let host = WidgetHost::new();
//! let surface = Rc::new(RefCell::new(RecordingSurface::new()));
//! let line = AnimatedLine::new(
//!     &host,
//!     Rect::new(0.0, 0.0, 200.0, 60.0),
//!     surface.clone(),
//!     LineConfig::default(),
//! )
//! .unwrap();
//!
//! host.dispatch(&InputEvent::pointer(EventKind::Move, 100.0, 30.0, 0));
//! host.advance(60);
//! assert_eq!(line.path(), "M 10 0 Q 100 0 190 0");
//! ```

pub mod animated_line;
pub mod googly_eyes;
pub mod host;
pub mod infinite_menu;
pub mod loader;
pub mod marquee;
pub mod surface;
pub mod text_randomizer;

pub use animated_line::{AnimatedLine, LineConfig};
pub use googly_eyes::{EyesConfig, GooglyEyes};
pub use host::WidgetHost;
pub use infinite_menu::{InfiniteMenu, MenuConfig};
pub use loader::{AnimatedLoader, LoaderConfig};
pub use marquee::{Marquee, MarqueeConfig, MarqueeStrip};
pub use surface::{
    format_number, BoundsSource, RecordingSurface, SharedBounds, SharedSurface, Surface,
    SurfaceCall, Transform,
};
pub use text_randomizer::{TextConfig, TextRandomizer};
