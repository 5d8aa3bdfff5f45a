use pax_console_core::{
    view::{ConfigPage, Page, SystemPage},
    LogEntry, Severity, ViewModel,
};
use std::time::Instant;

/// Prints what changed between two renders of the view model
pub struct Printer {
    started: Instant,
    last_header: String,
    last_seq: Option<u64>,
    last_status: String,
    last_progress: Option<String>,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_header: String::new(),
            last_seq: None,
            last_status: String::new(),
            last_progress: None,
        }
    }

    pub fn render(&mut self, view: &ViewModel) {
        let header = header(view);
        if header != self.last_header {
            if !header.is_empty() {
                println!("{header}");
            }
            self.last_header = header;
        }

        let fresh: Vec<&LogEntry> = view
            .log
            .iter()
            .rev()
            .filter(|entry| self.last_seq.is_none_or(|seq| entry.seq > seq))
            .collect();
        for entry in fresh {
            println!("{}", self.log_line(entry));
            self.last_seq = Some(entry.seq);
        }

        match &view.page {
            Page::Home(home) if home.status_hex != self.last_status => {
                if !home.status_hex.is_empty() {
                    println!("status: 0x{}", home.status_hex);
                }
                self.last_status = home.status_hex.clone();
            }
            Page::System(system) if system.progress_label != self.last_progress => {
                if let Some(progress) = &system.progress_label {
                    println!("upload: {progress}");
                }
                self.last_progress = system.progress_label.clone();
            }
            _ => {}
        }
    }

    fn log_line(&self, entry: &LogEntry) -> String {
        let level = match entry.severity {
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        format!(
            "[{:>7.1}s] {level:<5} {}",
            self.started.elapsed().as_secs_f32(),
            entry.message
        )
    }
}

pub fn header(view: &ViewModel) -> String {
    match (view.title.is_empty(), view.tagline.is_empty()) {
        (true, _) => String::new(),
        (false, true) => view.title.clone(),
        (false, false) => format!("{} - {}", view.title, view.tagline),
    }
}

pub fn system_lines(page: &SystemPage) -> Vec<String> {
    let app = match &page.app_link {
        Some(link) => format!("{} <{link}>", page.app_name),
        None => page.app_name.clone(),
    };
    vec![
        app,
        page.app_details.clone(),
        page.sha_line.clone(),
        page.hw_line.clone(),
    ]
}

pub fn config_lines(page: &ConfigPage) -> Vec<String> {
    let mut lines = vec![format!("config {}", page.version_label)];
    lines.extend(page.fields.iter().map(|field| {
        let value = if field.secret && !field.revealed && !field.value.is_empty() {
            "********"
        } else {
            field.value.as_str()
        };
        format!("  {:<12} {value}", field.label)
    }));
    lines
}
