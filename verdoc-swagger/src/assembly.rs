// Identity of the running service binary

use std::io;
use std::path::{Path, PathBuf};

/// Name and location of the running service.
///
/// The name titles the generated documents and names the XML documentation
/// file looked up next to the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyInfo {
    name: String,
    base_dir: PathBuf,
}

fn exe_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("executable has no parent directory"))
}

impl AssemblyInfo {
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
        }
    }

    /// The running executable: its file stem and directory
    pub fn current() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let name = exe
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| io::Error::other("executable name is not valid UTF-8"))?
            .to_string();
        Ok(Self::new(name, exe_dir()?))
    }

    /// A named service whose files live next to the running executable
    pub fn named(name: impl Into<String>) -> io::Result<Self> {
        Ok(Self::new(name, exe_dir()?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base_dir>/<name>.xml`
    pub fn xml_doc_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.xml", self.name))
    }
}
