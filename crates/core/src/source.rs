//! In-memory source units. The core does no I/O; callers hand in named
//! texts and batch order is preserved everywhere downstream.

#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Display name, typically a file name like `Foo.vsp`.
    pub name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Stem used to name the synthesized script class: the file name minus
    /// directories and the last extension. `src/Run.vsp` -> `Run`.
    pub fn stem(&self) -> &str {
        let base = self
            .name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.name);
        match base.rfind('.') {
            Some(0) | None => base,
            Some(i) => &base[..i],
        }
    }
}

/// An ordered batch of units compiled together. Units see each other's
/// declared classes during resolution.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    units: Vec<SourceUnit>,
}

impl SourceSet {
    pub fn new() -> Self {
        SourceSet::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.units.push(SourceUnit::new(name, text));
        self
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_path_and_extension() {
        assert_eq!(SourceUnit::new("Run.vsp", "").stem(), "Run");
        assert_eq!(SourceUnit::new("src/a/Run.vsp", "").stem(), "Run");
        assert_eq!(SourceUnit::new("Run", "").stem(), "Run");
        assert_eq!(SourceUnit::new("a.b.vsp", "").stem(), "a.b");
    }

    #[test]
    fn set_preserves_order() {
        let mut set = SourceSet::new();
        set.add("B.vsp", "").add("A.vsp", "");
        let names: Vec<_> = set.units().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["B.vsp", "A.vsp"]);
    }
}
