//! # Battle Tanks Client
//!
//! Connects the spatial reasoning core to the game server's JSON protocol:
//!
//! - [`protocol`]: server messages in, tank commands out
//! - [`commander`]: per-tick target selection, routing and firing
//! - [`runner`]: JSON-lines loop over any reader and writer
//!
//! ```text
//! stdin --GAMESTATE--> Runner --> Commander --> Router / SpatialIndex
//!                                     |
//! stdout <--MOVE/ROTATE/FIRE----------+
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod commander;
pub mod protocol;
pub mod runner;

pub use commander::{Commander, TankOrders};
pub use protocol::{GameMessage, ProtocolError, TankAction, TankCommand};
pub use runner::{RunSummary, Runner};
