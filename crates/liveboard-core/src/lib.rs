//! Liveboard Core Library
//!
//! Shape synchronization engine for the liveboard collaborative whiteboard:
//! canvas surface events become shape records in a replicated store, and
//! every store change is reconciled back onto the surface.

pub mod assets;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod interaction;
pub mod reconcile;
pub mod session;
pub mod shapes;
pub mod store;
pub mod surface;
pub mod tools;

pub use assets::{DecodingImageLoader, ImageLoader, ImageSource, LoadedImage};
pub use codec::{ShapeMap, ShapeRecord};
pub use commands::CommandDispatcher;
pub use config::SessionConfig;
pub use error::{AssetError, CommandError, CommandResult, StoreError, StoreResult};
pub use events::{KEY_BINDINGS, Key, KeyBinding, KeyCommand, KeyEvent, Modifiers, SurfaceEvent};
pub use identity::IdentityTable;
pub use interaction::{GestureState, InteractionSession};
pub use reconcile::{ReconcileReport, Reconciler};
pub use session::{Notification, Session};
pub use shapes::{Drawable, ShapeId, ShapeKind, ShapeStyle};
pub use store::{LoroShapeStore, SharedStore, ShapeTxn, SubscriptionId};
pub use surface::{CanvasSurface, ObjectHandle, SceneSurface};
pub use tools::{ActiveToolTracker, Tool, ToolEffect};
