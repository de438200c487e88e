// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

pub mod routes;
pub mod server;
pub mod state;

pub use state::AppState;
