use serde::{Deserialize, Serialize};

/// One dropped entry and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Function name, parameter, or entry key the diagnostic is about.
    pub subject: String,
    pub reason: String,
}

/// Append-only log of everything the pipeline dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subject: impl Into<String>, reason: impl Into<String>) {
        self.entries.push(Diagnostic { subject: subject.into(), reason: reason.into() });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All diagnostics whose subject is exactly `subject`.
    pub fn about<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| d.subject == subject)
    }

    /// Render as `subject<TAB>reason` lines.
    pub fn to_listing(&self) -> String {
        let mut out = String::new();
        for d in &self.entries {
            out.push_str(&d.subject);
            out.push('\t');
            out.push_str(&d.reason);
            out.push('\n');
        }
        out
    }
}
