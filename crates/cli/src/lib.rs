// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Empty library target so the `statemachine` binary can be declared as a
//! path dependency by the workspace's behavioural spec tests (needed for
//! Cargo to expose `CARGO_BIN_EXE_statemachine`).
