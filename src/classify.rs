//! Suffix-based classification of file and entry names.
//!
//! No magic bytes are sniffed here: a name that does not end with a known
//! container extension is never opened as a container.

pub const ZIP_EXTENSIONS: &[&str] = &[".jar", ".war", ".sar", ".ear", ".par", ".zip", ".apk"];
pub const TAR_EXTENSIONS: &[&str] = &[".tar.gz", ".tar"];

pub const MODULE_DESCRIPTOR: &str = "module-info.class";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Zip,
    Tar,
}

impl ContainerKind {
    /// Whether findings gathered before a mid-container failure still count.
    ///
    /// Zip containers keep what they found; a tar container that fails part-way
    /// contributes nothing.
    pub fn keeps_partial_findings(self) -> bool {
        matches!(self, ContainerKind::Zip)
    }
}

pub fn classify(name: &str) -> Option<ContainerKind> {
    if ZIP_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        Some(ContainerKind::Zip)
    } else if TAR_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        Some(ContainerKind::Tar)
    } else {
        None
    }
}

pub fn acceptable_filename(name: &str) -> bool {
    classify(name).is_some()
}

/// A `.class` member worth scanning; the module descriptor is skipped.
pub fn is_scannable_class(name: &str) -> bool {
    if !name.ends_with(".class") {
        return false;
    }
    let base = name.rsplit('/').next().unwrap_or(name);
    base != MODULE_DESCRIPTOR
}

/// Joins a container path label and a member name with `/`.
pub fn join_label(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognises_every_family_extension() {
        for name in ["a.jar", "a.war", "a.sar", "a.ear", "a.par", "a.zip", "a.apk"] {
            assert_eq!(classify(name), Some(ContainerKind::Zip), "{name}");
        }
        assert_eq!(classify("dist/app.tar.gz"), Some(ContainerKind::Tar));
        assert_eq!(classify("dist/app.tar"), Some(ContainerKind::Tar));
    }

    #[test]
    fn classify_ignores_other_suffixes() {
        assert_eq!(classify("notes.txt"), None);
        assert_eq!(classify("Foo.class"), None);
        assert_eq!(classify("app.tgz"), None);
        assert_eq!(classify("app.JAR"), None);
        assert_eq!(classify("jar"), None);
        assert!(!acceptable_filename("archive.gz"));
    }

    #[test]
    fn module_descriptor_is_not_scannable() {
        assert!(is_scannable_class("org/example/Foo.class"));
        assert!(is_scannable_class("Foo.class"));
        assert!(!is_scannable_class("module-info.class"));
        assert!(!is_scannable_class("META-INF/versions/11/module-info.class"));
        assert!(!is_scannable_class("org/example/Foo.java"));
    }

    #[test]
    fn join_label_handles_empty_parent() {
        assert_eq!(join_label("", "Foo.class"), "Foo.class");
        assert_eq!(join_label("lib/app.jar", "Foo.class"), "lib/app.jar/Foo.class");
        assert_eq!(join_label("dir/", "x.jar"), "dir/x.jar");
    }

    #[test]
    fn only_zip_keeps_partial_findings() {
        assert!(ContainerKind::Zip.keeps_partial_findings());
        assert!(!ContainerKind::Tar.keeps_partial_findings());
    }
}
