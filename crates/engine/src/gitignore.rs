use std::path::Path;
use std::sync::Arc;

use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

pub const IGNORE_FILE: &str = ".gitignore";

/// Chain of `.gitignore` matchers from the working directory downwards.
///
/// A directory without its own ignore file shares its parent's scope
/// unchanged.
#[derive(Clone, Debug, Default)]
pub struct IgnoreScope {
    matcher: Option<Arc<Gitignore>>,
    parent: Option<Arc<IgnoreScope>>,
}

impl IgnoreScope {
    /// Scope that ignores nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn root(dir: impl AsRef<Path>, enabled: bool) -> Self {
        Self::none().child(dir, enabled)
    }

    /// Scope for `dir`, extending `self` with `dir/.gitignore` if present.
    pub fn child(&self, dir: impl AsRef<Path>, enabled: bool) -> Self {
        if !enabled {
            return self.clone();
        }
        let dir = dir.as_ref();
        let file = dir.join(IGNORE_FILE);
        if !file.is_file() {
            return self.clone();
        }
        let mut builder = GitignoreBuilder::new(dir);
        if let Some(err) = builder.add(&file) {
            log::warn!("{}: {err}", file.display());
        }
        match builder.build() {
            Ok(matcher) => Self {
                matcher: Some(Arc::new(matcher)),
                parent: Some(Arc::new(self.clone())),
            },
            Err(err) => {
                log::warn!("{}: {err}", file.display());
                self.clone()
            }
        }
    }

    /// The innermost matcher with an opinion decides; a whitelist (`!pattern`)
    /// overrides any outer ignore.
    pub fn is_ignored(&self, path: impl AsRef<Path>, is_dir: bool) -> bool {
        let path = path.as_ref();
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(matcher) = &current.matcher {
                match matcher.matched(path, is_dir) {
                    Match::Ignore(_) => return true,
                    Match::Whitelist(_) => return false,
                    Match::None => {}
                }
            }
            scope = current.parent.as_deref();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_without_ignore_file_nothing_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let scope = IgnoreScope::root(dir.path(), true);
        assert!(!scope.is_ignored(dir.path().join("a.txt"), false));
    }

    #[test]
    fn test_child_extends_parent() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "*.log\n").unwrap();
        fs::write(sub.join(IGNORE_FILE), "*.tmp\n!keep.log\n").unwrap();

        let root = IgnoreScope::root(dir.path(), true);
        let child = root.child(&sub, true);

        assert!(root.is_ignored(dir.path().join("debug.log"), false));
        assert!(!root.is_ignored(dir.path().join("a.tmp"), false));
        assert!(child.is_ignored(sub.join("a.tmp"), false));
        assert!(child.is_ignored(sub.join("debug.log"), false));
        assert!(!child.is_ignored(sub.join("keep.log"), false));
        assert!(!child.is_ignored(sub.join("a.txt"), false));
    }

    #[test]
    fn test_disabled_scope_ignores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(IGNORE_FILE), "*.log\n").unwrap();

        let scope = IgnoreScope::root(dir.path(), false);
        assert!(!scope.is_ignored(dir.path().join("debug.log"), false));
    }
}
