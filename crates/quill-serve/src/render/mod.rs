//! HTML rendering with maud.
//!
//! All pages share the [`components::page`] shell; route modules compose
//! their bodies from the fragments here. Interpolated values are escaped by
//! maud; filtered post content is the one deliberate `PreEscaped` insertion.

pub mod components;
