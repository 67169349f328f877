use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use radar_types::JobStatus;

/// Colors when stdout is a terminal and `NO_COLOR` is unset.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn detect() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn status(&self, status: JobStatus) -> String {
        let text = status.as_str();
        if !self.enabled {
            return text.to_string();
        }
        match status {
            JobStatus::Completed => text.green().to_string(),
            JobStatus::Failed => text.red().to_string(),
            JobStatus::Pending => text.dimmed().to_string(),
            _ => text.yellow().to_string(),
        }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn added(&self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn removed(&self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.enabled {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}
