//! Waymark Core - Anchor records
//!
//! The plain data shared by every Waymark crate: anchor identities, display
//! names and the positional payload captured by the AR session that placed
//! the anchor. Nothing in here knows about edges or paths; see
//! `waymark-graph` for that.
//!
//! # Example
//!
//! ```
//! use waymark_core::{Anchor, Translation};
//!
//! let lobby = Anchor::new(0, "Lobby", Translation::new(0.0, 0.0, -1.5));
//! let desk: Translation = "3.0, 4.0, -1.5".parse().unwrap();
//! assert_eq!(lobby.translation.distance(&desk), 5.0);
//! ```

mod anchor;
mod error;
mod translation;

pub use anchor::{Anchor, AnchorId};
pub use error::ParseTranslationError;
pub use translation::Translation;
