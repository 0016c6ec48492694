use std::path::{Path, PathBuf};

/// Where the files to patch and the replacement sources live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the disassembled app carrying the replacement methods and support classes
    pub apk_dir: PathBuf,

    /// Root of the disassembled `services.jar` being patched
    pub services_dir: PathBuf,
}

impl Settings {
    pub const DEFAULT_APK_DIR: &'static str = "apk";
    pub const DEFAULT_SERVICES_DIR: &'static str = "services";

    pub fn new(apk_dir: impl Into<PathBuf>, services_dir: impl Into<PathBuf>) -> Settings {
        Settings {
            apk_dir: apk_dir.into(),
            services_dir: services_dir.into(),
        }
    }

    /// Resolve a `/`-separated path under the services root
    pub fn services_path(&self, relative: &str) -> PathBuf {
        build_path(&self.services_dir, relative)
    }

    /// Resolve a `/`-separated path under the apk root
    pub fn apk_path(&self, relative: &str) -> PathBuf {
        build_path(&self.apk_dir, relative)
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new(Self::DEFAULT_APK_DIR, Self::DEFAULT_SERVICES_DIR)
    }
}

fn build_path(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in relative.split('/').filter(|c| !c.is_empty()) {
        path.push(component);
    }
    path
}

/// Short name used when reporting on a file (`Foo` for `a/b/Foo.smali`)
pub fn display_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".smali") {
        Some(stem) => stem.to_owned(),
        None => name,
    }
}
