//! Source files tagged with their language, validated up front.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use clap::ValueEnum;

use super::BuildError;

const PROGRAM_EXTENSION: &str = "exe";
const OBJECT_EXTENSION: &str = "o";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Language {
    #[value(name = "c")]
    C,
    #[value(name = "cpp", alias = "c++", alias = "cxx")]
    Cpp,
    #[value(name = "fortran", alias = "f90")]
    Fortran,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" => Some(Self::Cpp),
            "f90" | "f95" | "f03" | "f08" | "f" => Some(Self::Fortran),
            _ => None,
        }
    }

    /// Extension used when writing a cell of this language.
    pub fn extension(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Fortran => "f90",
        }
    }

    pub fn compiler_key(self) -> &'static str {
        match self {
            Self::C => "CC",
            Self::Cpp => "CXX",
            Self::Fortran => "FC",
        }
    }

    pub fn flags_key(self) -> &'static str {
        match self {
            Self::C => "CFLAGS",
            Self::Cpp => "CXXFLAGS",
            Self::Fortran => "FCFLAGS",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Fortran => "Fortran",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

impl SourceFile {
    /// `<stem>.o` inside `out_dir`, wherever the source itself lives.
    pub fn object_path(&self, out_dir: &Path) -> PathBuf {
        artifact_path(&self.path, out_dir, OBJECT_EXTENSION)
    }
}

fn artifact_path(source: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let mut name = source.file_stem().unwrap_or(source.as_os_str()).to_os_string();
    name.push(".");
    name.push(extension);
    out_dir.join(name)
}

/// Ordered sources for one build. The last file names the program.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    sources: Vec<SourceFile>,
}

impl BuildRequest {
    pub fn new<I, P>(paths: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let sources = paths
            .into_iter()
            .map(|p| {
                let path = p.into();
                match Language::from_path(&path) {
                    Some(language) => Ok(SourceFile { path, language }),
                    None => Err(BuildError::UnknownLanguage(path)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if sources.is_empty() {
            return Err(BuildError::NoSources);
        }
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn objects(&self, out_dir: &Path) -> Vec<PathBuf> {
        self.sources.iter().map(|s| s.object_path(out_dir)).collect()
    }

    pub fn program_path(&self, out_dir: &Path) -> PathBuf {
        // `new` guarantees at least one source.
        self.sources
            .last()
            .map(|s| artifact_path(&s.path, out_dir, PROGRAM_EXTENSION))
            .unwrap_or_default()
    }
}
