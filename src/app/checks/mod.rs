//! Project health checks: setup verification, production readiness and the
//! model connection test.
//!
//! Checks produce a [`CheckReport`] rather than printing directly, so the
//! binary decides how to show them and tests can inspect individual items.

pub mod connection;
pub mod production;
pub mod setup;

pub const RULE: &str = "======================================================================";
pub const THIN_RULE: &str = "----------------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Failed,
}

impl CheckStatus {
    pub fn marker(self) -> &'static str {
        match self {
            CheckStatus::Ok => "✅",
            CheckStatus::Warning => "⚠️ ",
            CheckStatus::Failed => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub label: String,
    pub status: CheckStatus,
    pub detail: Option<String>,
    /// Follow-up command or advice printed under the item.
    pub hint: Option<String>,
}

impl CheckItem {
    pub fn new(label: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            label: label.into(),
            status,
            detail: None,
            hint: None,
        }
    }

    pub fn ok(label: impl Into<String>) -> Self {
        Self::new(label, CheckStatus::Ok)
    }

    pub fn warning(label: impl Into<String>) -> Self {
        Self::new(label, CheckStatus::Warning)
    }

    pub fn failed(label: impl Into<String>) -> Self {
        Self::new(label, CheckStatus::Failed)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![match &self.detail {
            Some(detail) => format!("{} {:<40} {}", self.status.marker(), self.label, detail),
            None => format!("{} {}", self.status.marker(), self.label),
        }];
        if let Some(hint) = &self.hint {
            lines.push(format!("   {}", hint));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSection {
    pub title: String,
    pub items: Vec<CheckItem>,
}

impl CheckSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: CheckItem) {
        self.items.push(item);
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| item.status == CheckStatus::Failed)
    }

    pub fn item(&self, label: &str) -> Option<&CheckItem> {
        self.items.iter().find(|item| item.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub title: String,
    pub sections: Vec<CheckSection>,
}

impl CheckReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: CheckSection) {
        self.sections.push(section);
    }

    pub fn all_ok(&self) -> bool {
        !self.sections.iter().any(CheckSection::has_failures)
    }

    pub fn section(&self, title_fragment: &str) -> Option<&CheckSection> {
        self.sections
            .iter()
            .find(|section| section.title.contains(title_fragment))
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![RULE.to_string(), self.title.clone(), RULE.to_string()];
        for section in &self.sections {
            lines.push(String::new());
            lines.push(section.title.clone());
            lines.push(THIN_RULE.to_string());
            for item in &section.items {
                lines.extend(item.render());
            }
        }
        lines.push(String::new());
        lines
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(15234567), "15,234,567");
    }

    #[test]
    fn test_report_fails_only_on_failed_items() {
        let mut section = CheckSection::new("FILES");
        section.push(CheckItem::ok("app.py"));
        section.push(CheckItem::warning("README.md"));
        let mut report = CheckReport::new("CHECK");
        report.push(section);
        assert!(report.all_ok());

        let mut section = CheckSection::new("DEPENDENCIES");
        section.push(CheckItem::failed("Flask").with_hint("pip install Flask"));
        report.push(section);
        assert!(!report.all_ok());

        let rendered = report.render();
        assert!(rendered.contains(&"❌ Flask".to_string()));
        assert!(rendered.contains(&"   pip install Flask".to_string()));
    }
}
