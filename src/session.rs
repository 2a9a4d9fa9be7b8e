/// One manually entered intervention/quantity pair. The unit is fixed when
/// the entry is added, derived from the intervention's schedule category.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    pub key: String,
    pub quantity: f64,
    pub unit: String,
}

/// Caller-owned manual-entry list. All mutation goes through explicit
/// add/clear calls; nothing else shares it, so no locking discipline applies.
#[derive(Debug, Clone, Default)]
pub struct ManualSession {
    entries: Vec<ManualEntry>,
}

impl ManualSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ManualEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ManualEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ManualEntry, ManualSession};

    fn entry(key: &str, quantity: f64) -> ManualEntry {
        ManualEntry {
            key: key.to_string(),
            quantity,
            unit: "item".to_string(),
        }
    }

    #[test]
    fn session_preserves_entry_order() {
        let mut session = ManualSession::new();
        session.add(entry("Pothole", 5.0));
        session.add(entry("Signage", 2.0));
        session.add(entry("Pothole", 1.0));

        let keys: Vec<&str> = session
            .entries()
            .iter()
            .map(|entry| entry.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Pothole", "Signage", "Pothole"]);
    }

    #[test]
    fn clear_empties_the_session() {
        let mut session = ManualSession::new();
        session.add(entry("Pothole", 5.0));
        assert_eq!(session.len(), 1);

        session.clear();
        assert!(session.is_empty());
        assert!(session.entries().is_empty());
    }
}
