//! Headless application core (state/action/effect).

pub mod action;
pub mod documents;
pub mod effect;
pub mod explorer;
pub mod git;
pub mod language;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::{Action, DirListing};
pub use documents::{Document, DocumentId, DocumentRegistry, SaveRequest};
pub use effect::Effect;
pub use explorer::{Decoration, ExplorerRow, ExplorerState, RenderRequest, ToggleOutcome};
pub use git::{GitOverlay, GitStatusKind};
pub use session::{RestoredDocument, SessionSnapshot, SessionTab, WindowBounds};
pub use state::AppState;
pub use store::{DispatchResult, Store};
