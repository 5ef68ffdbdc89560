//! Dotted module path <-> file path convention
//!
//! `a.b.c` lives in `a/b/c.lua`, or in `a/b/c/init.lua` when `a/b/c` is a
//! directory.

use std::path::{Path, PathBuf};

pub const MODULE_EXTENSION: &str = "lua";

const PACKAGE_INIT: &str = "init.lua";

/// `root/a/b/c` for the dotted path `a.b.c`, without extension
pub fn module_base(root: &Path, dotted_path: &str) -> PathBuf {
    dotted_path
        .split('.')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Candidate file for a module base, honoring the package convention
pub fn module_file(base: &Path) -> PathBuf {
    if base.is_dir() {
        base.join(PACKAGE_INIT)
    } else {
        with_module_extension(base)
    }
}

/// Resolve a dotted path to an existing file: `a/b/c.lua` first, then
/// `a/b/c/init.lua`
pub fn resolve_module_file(root: &Path, dotted_path: &str) -> Option<PathBuf> {
    let base = module_base(root, dotted_path);

    let file = with_module_extension(&base);
    if file.is_file() {
        return Some(file);
    }

    let init = base.join(PACKAGE_INIT);
    init.is_file().then_some(init)
}

/// Append `.lua` without replacing an existing dotted suffix in the last segment
pub fn with_module_extension(base: &Path) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(".");
    path.push(MODULE_EXTENSION);
    PathBuf::from(path)
}

/// Whether a path carries the module extension
pub fn is_module_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == MODULE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_module_base_joins_segments() {
        let base = module_base(Path::new("/src"), "st.zigbee.zcl");
        assert_eq!(base, PathBuf::from("/src/st/zigbee/zcl"));
    }

    #[test]
    fn test_resolve_prefers_file_over_package() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("pkg/mod"))?;
        fs::write(root.join("pkg/mod.lua"), "-- file")?;
        fs::write(root.join("pkg/mod/init.lua"), "-- package")?;

        assert_eq!(
            resolve_module_file(root, "pkg.mod"),
            Some(root.join("pkg/mod.lua"))
        );
        assert_eq!(module_file(&root.join("pkg/mod")), root.join("pkg/mod/init.lua"));
        Ok(())
    }

    #[test]
    fn test_resolve_package_init() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("pkg"))?;
        fs::write(root.join("pkg/init.lua"), "-- package")?;

        assert_eq!(resolve_module_file(root, "pkg"), Some(root.join("pkg/init.lua")));
        assert_eq!(resolve_module_file(root, "missing"), None);
        Ok(())
    }

    #[test]
    fn test_extension_is_appended() {
        assert_eq!(
            with_module_extension(Path::new("a/v1.2")),
            PathBuf::from("a/v1.2.lua")
        );
        assert!(is_module_file(Path::new("a/b.lua")));
        assert!(!is_module_file(Path::new("a/b.luac")));
    }
}
