//! Model-View-Intent primitives shared by the stateful parts of the crate.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Renderer
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! - **State**: value snapshot read by the renderer
//! - **Intent**: user edits, fetch results and broker notices
//! - **Reducer**: pure `(State, Intent) -> State` transition

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::ViewState;
