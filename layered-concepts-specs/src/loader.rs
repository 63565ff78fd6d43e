//! Fixture file loading.

use crate::{parse_fixture, ConceptFixture, SpecError};
use std::fs;
use std::path::Path;

/// File extension of fixture files.
pub const FIXTURE_EXTENSION: &str = "concepts";

/// Load a single fixture file.
pub fn load_fixture(path: &Path) -> Result<ConceptFixture, SpecError> {
    let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_fixture(&content)
}

/// Load all fixtures from a directory (glob: **/*.concepts), sorted by
/// relative path.
pub fn load_all_fixtures(dir: &Path) -> Result<Vec<(String, ConceptFixture)>, SpecError> {
    let mut fixtures = Vec::new();
    load_fixtures_recursive(dir, dir, &mut fixtures)?;
    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(fixtures)
}

fn load_fixtures_recursive(
    base: &Path,
    dir: &Path,
    fixtures: &mut Vec<(String, ConceptFixture)>,
) -> Result<(), SpecError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let load_error = |e: std::io::Error| SpecError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    };
    for entry in fs::read_dir(dir).map_err(load_error)? {
        let path = entry.map_err(load_error)?.path();

        if path.is_dir() {
            load_fixtures_recursive(base, &path, fixtures)?;
        } else if path.extension().map_or(false, |e| e == FIXTURE_EXTENSION) {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            let fixture = load_fixture(&path)?;
            fixtures.push((relative.display().to_string(), fixture));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("recall-and-bias.concepts");
        let fixture = load_fixture(&path).unwrap();
        assert!(fixture.title.is_some());
    }

    #[test]
    fn test_load_all_fixtures_recurses() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.concepts"), "# B\n@ X: x\nx\n").unwrap();
        fs::write(dir.path().join("nested").join("a.concepts"), "# A\n@ X: x\nx\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<_> = load_all_fixtures(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["b.concepts", "nested/a.concepts"]);
    }

    #[test]
    fn test_load_missing_fixture() {
        let err = load_fixture(Path::new("/nonexistent/x.concepts")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.concepts"));
    }
}
