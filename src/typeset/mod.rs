// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

pub mod engine;
pub mod machine;
pub mod scheduler;

pub use engine::{CommandEngine, TypesetEngine, TypesetError};
pub use machine::{Phase, TypesetMachine};
pub use scheduler::TypesetScheduler;
