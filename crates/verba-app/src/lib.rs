// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod focus;
pub mod ids;
pub mod message_log;
pub mod model;
pub mod pane;
pub mod query;
pub mod result_set;
pub mod session;
pub mod state;
pub mod transport;

pub use focus::*;
pub use ids::*;
pub use message_log::*;
pub use model::*;
pub use pane::*;
pub use query::*;
pub use result_set::*;
pub use session::*;
pub use state::*;
pub use transport::*;
