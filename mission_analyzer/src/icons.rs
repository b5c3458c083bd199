//! module Icons
//!
//! Centralized Unicode icons used in reports and console output. The use for
//! each is self-evident from the constant name.

pub const ICON_WALK: &str = "\u{1F6B6}"; // 🚶
pub const ICON_RUN: &str = "\u{1F3C3}"; // 🏃
pub const ICON_LOOK: &str = "\u{1F440}"; // 👀
pub const ICON_DELAY: &str = "\u{23F3}"; // ⏳
pub const ICON_END: &str = "\u{1F6D1}"; // 🛑
pub const ICON_ANIMATION: &str = "\u{1F57A}"; // 🕺
pub const ICON_CROUCH: &str = "\u{1F9CE}"; // 🧎
pub const ICON_QUIT: &str = "\u{1F6AB}"; // 🚫
pub const ICON_SUCCESS: &str = "\u{2611}"; // ☑
pub const ICON_WARNING: &str = "⚠︎"; // U+26A0 U+FE0E
