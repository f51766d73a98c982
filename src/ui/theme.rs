use owo_colors::Style;
use std::sync::OnceLock;
use crate::record::ApplicationStatus;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for CLI output
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub info: Style,
    pub dim: Style,
    pub applied: Style,
    pub interview: Style,
    pub offer: Style,
    pub rejected: Style,
}

impl Theme {
    /// Colours only when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() || !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            applied: Style::new().blue(),
            interview: Style::new().yellow().bold(),
            offer: Style::new().green().bold(),
            rejected: Style::new().bright_black(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            applied: Style::new(),
            interview: Style::new(),
            offer: Style::new(),
            rejected: Style::new(),
        }
    }

    pub fn status(&self, status: ApplicationStatus) -> Style {
        match status {
            ApplicationStatus::Applied => self.applied.clone(),
            ApplicationStatus::Interview => self.interview.clone(),
            ApplicationStatus::Offer => self.offer.clone(),
            ApplicationStatus::Rejected => self.rejected.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
