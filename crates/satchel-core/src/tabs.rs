//! # Main Tabs
//!
//! Descriptors for the tabbed main layout. The renderer owns the actual
//! navigator; this module only says which tabs exist and how they are tinted.
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │                                       │
//! │            (Home stack)               │
//! │                                       │
//! ├───────────────────┬───────────────────┤
//! │  [shopping-bag]   │  [person]         │
//! │      Home         │    Profile        │  ← label below icon, 10pt
//! └───────────────────┴───────────────────┘
//! ```

use serde::Serialize;

/// One tab of the main layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSpec {
    /// Route name.
    pub name: &'static str,

    /// Text shown under the icon.
    pub label: &'static str,

    /// Icon name in the eva icon pack.
    pub icon: &'static str,

    /// Route of the single screen inside the tab's stack.
    pub screen: &'static str,
}

/// Tabs of the main layout, in display order.
pub const MAIN_TABS: [TabSpec; 2] = [
    TabSpec {
        name: "Home",
        label: "Home",
        icon: "shopping-bag-outline",
        screen: "Home",
    },
    TabSpec {
        name: "Profile",
        label: "Profile",
        icon: "person-outline",
        screen: "ProfileScreen",
    },
];

/// Tint and typography shared by tab icons and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStyle {
    pub focused_color: &'static str,
    pub unfocused_color: &'static str,
    pub label_font_size: u8,
    pub label_below_icon: bool,
}

impl TabStyle {
    /// Returns the icon/label colour for a focus state.
    pub fn tint(&self, focused: bool) -> &'static str {
        if focused {
            self.focused_color
        } else {
            self.unfocused_color
        }
    }
}

impl Default for TabStyle {
    fn default() -> Self {
        TabStyle {
            focused_color: "#FF5252",
            unfocused_color: "#999",
            label_font_size: 10,
            label_below_icon: true,
        }
    }
}
