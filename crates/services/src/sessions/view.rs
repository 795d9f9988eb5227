use std::fmt;

use exam_core::model::SectionId;

/// The screen the session is currently presenting.
///
/// Section-bound views carry the section they show; the rest carry nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    MainMenu,
    Instructions { section: SectionId },
    Exam { section: SectionId },
    Results { section: SectionId },
    FinalResults,
    Settings,
    Bookmarks,
    Analytics,
    Review { section: SectionId },
}

impl View {
    /// Stable kebab-case name, used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading => "loading",
            View::MainMenu => "main-menu",
            View::Instructions { .. } => "instructions",
            View::Exam { .. } => "exam",
            View::Results { .. } => "results",
            View::FinalResults => "final-results",
            View::Settings => "settings",
            View::Bookmarks => "bookmarks",
            View::Analytics => "analytics",
            View::Review { .. } => "review",
        }
    }

    #[must_use]
    pub fn section(&self) -> Option<&SectionId> {
        match self {
            View::Instructions { section }
            | View::Exam { section }
            | View::Results { section }
            | View::Review { section } => Some(section),
            _ => None,
        }
    }

    /// Menu-level views can be reached with `Screen` and do not depend on an active section.
    #[must_use]
    pub fn is_menu_level(&self) -> bool {
        matches!(
            self,
            View::MainMenu | View::FinalResults | View::Settings | View::Bookmarks | View::Analytics
        )
    }

    #[must_use]
    pub fn is_exam(&self) -> bool {
        matches!(self, View::Exam { .. })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section() {
            Some(section) => write!(f, "{} ({section})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Menu-level destinations reachable by free navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Settings,
    Bookmarks,
    Analytics,
    FinalResults,
}

impl From<Screen> for View {
    fn from(screen: Screen) -> Self {
        match screen {
            Screen::MainMenu => View::MainMenu,
            Screen::Settings => View::Settings,
            Screen::Bookmarks => View::Bookmarks,
            Screen::Analytics => View::Analytics,
            Screen::FinalResults => View::FinalResults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_map_to_menu_level_views() {
        for screen in [
            Screen::MainMenu,
            Screen::Settings,
            Screen::Bookmarks,
            Screen::Analytics,
            Screen::FinalResults,
        ] {
            assert!(View::from(screen).is_menu_level());
        }
    }

    #[test]
    fn display_includes_section() {
        let view = View::Exam {
            section: "HPGE".into(),
        };
        assert_eq!(view.to_string(), "exam (HPGE)");
        assert_eq!(View::MainMenu.to_string(), "main-menu");
        assert!(!view.is_menu_level());
        assert!(!View::Loading.is_menu_level());
    }
}
