//! Checkout, compile and install command lines

use std::path::{Path, PathBuf};

use super::ExtensionKind;
use crate::process::{make_escape, Invocation};

/// Fully parameterised commands for one source build
#[derive(Debug, Clone)]
pub struct BuildPlan {
    name: String,
    gisbase: PathBuf,
    workspace_root: PathBuf,
    /// `<workspace>/<name>`, the checkout and distribution directory
    dist_dir: PathBuf,
    prefix: PathBuf,
}

impl BuildPlan {
    pub fn new(name: &str, gisbase: &Path, workspace_root: &Path, prefix: &Path) -> Self {
        Self {
            name: name.to_string(),
            gisbase: gisbase.to_path_buf(),
            workspace_root: workspace_root.to_path_buf(),
            dist_dir: workspace_root.join(name),
            prefix: prefix.to_path_buf(),
        }
    }

    /// `svn checkout` of the module, run from the workspace root
    pub fn checkout(&self, source_url: &str) -> Invocation {
        Invocation::new("svn")
            .arg("checkout")
            .arg(source_url)
            .current_dir(&self.workspace_root)
    }

    /// Compile into the distribution directory; GUI builds only get the top directory
    pub fn compile(&self, kind: &ExtensionKind) -> Invocation {
        let make = Invocation::new("make")
            .arg(format!("MODULE_TOPDIR={}", make_escape(&self.gisbase)))
            .current_dir(&self.dist_dir);

        if kind.is_gui() {
            return make;
        }

        make.arg(format!("BIN={}", self.dist_path(&["bin"])))
            .arg(format!("HTMLDIR={}", self.dist_path(&["docs", "html"])))
            .arg(format!("MANDIR={}", self.dist_path(&["man", "man1"])))
            .arg(format!("SCRIPTDIR={}", self.dist_path(&["scripts"])))
            .arg(format!("ETC={}", self.dist_path(&["etc", &self.name])))
    }

    /// Copy the distribution directory into the install prefix
    pub fn install(&self) -> Invocation {
        Invocation::new("make")
            .arg(format!("MODULE_TOPDIR={}", self.gisbase.display()))
            .arg(format!("ARCH_DISTDIR={}", self.dist_dir.display()))
            .arg(format!("INST_DIR={}", self.prefix.display()))
            .arg("install")
            .current_dir(&self.dist_dir)
    }

    fn dist_path(&self, parts: &[&str]) -> String {
        parts
            .iter()
            .fold(self.dist_dir.clone(), |path, part| path.join(part))
            .display()
            .to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::category::Category;
    use pretty_assertions::assert_eq;

    fn plan() -> BuildPlan {
        BuildPlan::new(
            "r.foo",
            Path::new("/opt/grass 7"),
            Path::new("/tmp/ws"),
            Path::new("/home/u/.grass7/addons"),
        )
    }

    #[test]
    fn test_compile_command() {
        let cmd = plan().compile(&ExtensionKind::Module(Category::Raster));
        assert_eq!(
            cmd.to_string(),
            "make MODULE_TOPDIR=/opt/grass\\ 7 BIN=/tmp/ws/r.foo/bin \
             HTMLDIR=/tmp/ws/r.foo/docs/html MANDIR=/tmp/ws/r.foo/man/man1 \
             SCRIPTDIR=/tmp/ws/r.foo/scripts ETC=/tmp/ws/r.foo/etc/r.foo"
        );
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/ws/r.foo")));
    }

    #[test]
    fn test_gui_compile_only_passes_top_directory() {
        let cmd = plan().compile(&ExtensionKind::Gui);
        assert_eq!(cmd.args, vec!["MODULE_TOPDIR=/opt/grass\\ 7"]);
    }

    #[test]
    fn test_install_command() {
        assert_eq!(
            plan().install().to_string(),
            "make MODULE_TOPDIR=/opt/grass 7 ARCH_DISTDIR=/tmp/ws/r.foo \
             INST_DIR=/home/u/.grass7/addons install"
        );
    }

    #[test]
    fn test_checkout_runs_in_workspace_root() {
        let cmd = plan().checkout("http://svn.example.org/grass7/raster/r.foo");
        assert_eq!(cmd.args, vec!["checkout", "http://svn.example.org/grass7/raster/r.foo"]);
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/ws")));
    }
}
