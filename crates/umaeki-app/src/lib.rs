// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod ids;
pub mod kana;
pub mod model;
pub mod state;
pub mod table;
pub mod view;

pub use columns::*;
pub use ids::*;
pub use model::*;
pub use state::*;
pub use table::*;
pub use view::*;
