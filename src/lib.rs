// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

//! Question/answer conversations rendered as rich text with inline math.
//!
//! A raw JSON value flows through [`conversation`] (tuples to units),
//! [`tokenizer`] (fields to text/math tokens) and [`render`] (tokens to a
//! node tree). [`view::QaView`] ties these to one display surface and its
//! [`typeset::TypesetScheduler`].

pub mod config;
pub mod conversation;
pub mod html_flake;
pub mod render;
pub mod tokenizer;
pub mod typeset;
pub mod view;
