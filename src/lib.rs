// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

pub mod benchmark;
pub mod charts;
pub mod chat;
pub mod compare;
pub mod config;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod narrative;
pub mod pipeline;
pub mod statement;
pub mod web;
