use std::collections::HashSet;

/// Turns raw header cells into unique column names.
///
/// Blank cells become `Unnamed: <index>`; a repeated name gets `.1`, `.2`, …
/// appended, skipping suffixes that are already taken.
#[derive(Default)]
pub(crate) struct HeaderBuilder {
    names: Vec<String>,
    taken: HashSet<String>,
}

impl HeaderBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, raw: &str) {
        let base = if raw.is_empty() {
            format!("Unnamed: {}", self.names.len())
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while self.taken.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }

        self.taken.insert(name.clone());
        self.names.push(name);
    }

    pub(crate) fn finish(self) -> Vec<String> {
        self.names
    }
}
