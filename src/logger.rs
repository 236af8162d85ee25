use crate::cli::{LogConfig, OutputFormat};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Clone)]
pub struct Logger {
    config: LogConfig,
}

#[derive(Serialize)]
struct JsonEvent {
    #[serde(rename = "type")]
    event_type: String,
    timestamp: DateTime<Utc>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn info(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        self.output("info", message, None);
    }

    pub fn progress(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        self.output("progress", message, None);
    }

    pub fn success(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        self.output("success", message, None);
    }

    pub fn warn(&self, message: &str) {
        self.output("warn", message, None);
    }

    pub fn error(&self, message: &str) {
        self.output("error", message, None);
    }

    pub fn debug(&self, message: &str) {
        if !self.config.verbose {
            return;
        }
        self.output("debug", message, None);
    }

    pub fn moved(&self, src: &Path, dst: &Path) {
        if self.config.quiet {
            return;
        }
        let data = serde_json::json!({
            "src": src.display().to_string(),
            "dst": dst.display().to_string()
        });
        self.output(
            "move",
            &format!("move: {}\n   -> {}", src.display(), dst.display()),
            Some(data),
        );
    }

    pub fn renamed(&self, src: &Path, dst: &Path) {
        if self.config.quiet {
            return;
        }
        let data = serde_json::json!({
            "src": src.display().to_string(),
            "dst": dst.display().to_string()
        });
        self.output(
            "rename",
            &format!("rename: {}\n     -> {}", src.display(), dst.display()),
            Some(data),
        );
    }

    pub fn dir_created(&self, path: &Path) {
        if self.config.quiet {
            return;
        }
        let data = serde_json::json!({ "path": path.display().to_string() });
        self.output("dir_created", &format!("+dir: {}", path.display()), Some(data));
    }

    pub fn dir_removed(&self, path: &Path) {
        if self.config.quiet {
            return;
        }
        let data = serde_json::json!({ "path": path.display().to_string() });
        self.output("dir_removed", &format!("-del: {}", path.display()), Some(data));
    }

    pub fn linked(&self, target: &Path, link: &Path) {
        if !self.config.verbose {
            return;
        }
        let data = serde_json::json!({
            "target": target.display().to_string(),
            "link": link.display().to_string()
        });
        self.output(
            "link",
            &format!("{}\n-> {}", target.display(), link.display()),
            Some(data),
        );
    }

    pub fn chunk_summary(&self, label: &str, count: usize) {
        let data = serde_json::json!({
            "chunk": label,
            "items": count
        });
        self.output("chunk", &format!("{} = {} items", label, count), Some(data));
    }

    fn output(&self, event_type: &str, message: &str, data: Option<serde_json::Value>) {
        match self.config.output_format {
            OutputFormat::Json => {
                let event = JsonEvent {
                    event_type: event_type.to_string(),
                    timestamp: Utc::now(),
                    message: message.to_string(),
                    data,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{}", json);
                }
            }
            OutputFormat::Text => {
                let prefix = match event_type {
                    "error" => "[ERROR]",
                    "warn" => "[WARN]",
                    "debug" | "link" => "[DEBUG]",
                    "progress" => "[...]",
                    "success" => "[OK]",
                    "move" | "rename" => "[MOVE]",
                    "dir_created" | "dir_removed" => "[DIR]",
                    "chunk" => "[CHUNK]",
                    _ => "[INFO]",
                };
                match event_type {
                    "error" | "warn" => eprintln!("{} {}", prefix, message),
                    _ => println!("{} {}", prefix, message),
                }
            }
        }
    }
}
