//! Staging and archive path resolution.
//!
//! Every downloaded artifact lands at a path derived only from the package
//! name, the variation's architecture and the spec output directory. Which
//! shape that path takes depends on the package: a small table of known
//! packages ship `<name>.tar.gz` tarballs, everything else is stored under
//! its bare name.
//!
//! ```text
//! <out>/kubernetes-cni/x86_64/kubernetes-cni.tar.gz   (Tarball, with arch)
//! <out>/cri-tools/cri-tools.tar.gz                     (Tarball, no arch)
//! <out>/some-other-package/some-other-package          (Raw)
//! <out>/kubernetes-cni_1.2.3.orig.tar.gz               (final archive)
//! ```

use std::path::{Path, PathBuf};

/// How a package's downloaded artifact is named inside the staging directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageLayout {
    /// `<name>[/<arch>]/<name>.tar.gz`
    Tarball,
    /// `<name>/<name>`, no extension and no architecture segment.
    Raw,
}

/// Packages with a known artifact layout. Anything missing here is `Raw`.
const PACKAGE_LAYOUTS: &[(&str, PackageLayout)] = &[
    ("kubernetes-cni", PackageLayout::Tarball),
    ("cri-tools", PackageLayout::Tarball),
    ("cri-o", PackageLayout::Tarball),
];

/// Go-style architecture names mapped to the names used in staging paths.
const ARCHITECTURES: &[(&str, &str)] = &[
    ("amd64", "x86_64"),
    ("arm64", "aarch64"),
    ("ppc64le", "ppc64le"),
    ("s390x", "s390x"),
];

impl PackageLayout {
    /// Look up the layout for a package name. Unknown names are `Raw`.
    pub fn for_package(name: &str) -> Self {
        PACKAGE_LAYOUTS
            .iter()
            .find(|(pkg, _)| *pkg == name)
            .map(|(_, layout)| *layout)
            .unwrap_or(PackageLayout::Raw)
    }
}

/// Translate an architecture into its staging directory name.
///
/// Unrecognized values pass through untouched; the empty string stays empty.
pub fn staging_arch(architecture: &str) -> &str {
    ARCHITECTURES
        .iter()
        .find(|(goarch, _)| *goarch == architecture)
        .map(|(_, arch)| *arch)
        .unwrap_or(architecture)
}

/// Per-package staging directory: `<spec_output_path>/<name>`.
pub fn staging_dir(pkg_name: &str, spec_output_path: &Path) -> PathBuf {
    spec_output_path.join(pkg_name)
}

/// Local path the artifact of one variation is downloaded to.
///
/// The artifact is extracted next to this path. For `Raw` layouts that is the
/// staging directory itself, so a top-level `<name>` entry in the artifact
/// overwrites the download and is then deleted along with it.
pub fn resolve_destination(pkg_name: &str, architecture: &str, spec_output_path: &Path) -> PathBuf {
    let mut path = staging_dir(pkg_name, spec_output_path);

    match PackageLayout::for_package(pkg_name) {
        PackageLayout::Tarball => {
            let arch = staging_arch(architecture);
            if !arch.is_empty() {
                path.push(arch);
            }
            path.push(format!("{pkg_name}.tar.gz"));
        }
        PackageLayout::Raw => path.push(pkg_name),
    }

    path
}

/// Final archive path: `<spec_output_path>/<name>_<version>.orig.tar.gz`.
pub fn resolve_archive_path(pkg_name: &str, version: &str, spec_output_path: &Path) -> PathBuf {
    spec_output_path.join(format!("{pkg_name}_{version}.orig.tar.gz"))
}
