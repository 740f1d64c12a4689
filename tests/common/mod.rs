//! Fake toolchain shared by the integration tests.
//!
//! The fake compiler and linker are shell scripts that record their argv in
//! `calls.txt`, so ordering and fail-fast behaviour can be checked without a
//! real compiler.

#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

pub struct FakeToolchain {
    pub root: TempDir,
}

impl FakeToolchain {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let tc = Self { root };
        fs::create_dir_all(tc.bin_dir()).unwrap();
        fs::create_dir_all(tc.run_dir()).unwrap();

        let calls = tc.calls_path();
        tc.script(
            "fakecc",
            &format!(
                r#"echo "compile $*" >> "{calls}"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
case "$*" in
  *fail_me*) echo "fatal: cannot compile" >&2; exit 3 ;;
esac
echo "threads=$OMP_NUM_THREADS"
: > "$out"
"#,
                calls = calls.display()
            ),
        );
        tc.script(
            "fakeld",
            &format!(
                r#"echo "link $*" >> "{calls}"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
printf '#!/bin/sh\necho "hello from program $*"\n[ "$1" = fail ] && exit 5\nexit 0\n' > "$out"
chmod +x "$out"
"#,
                calls = calls.display()
            ),
        );
        tc
    }

    fn script(&self, name: &str, body: &str) {
        let path = self.bin_dir().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    pub fn run_dir(&self) -> PathBuf {
        self.root.path().join("run")
    }

    pub fn calls_path(&self) -> PathBuf {
        self.root.path().join("calls.txt")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("hpcmagic.ini")
    }

    /// Recorded tool invocations, one per line.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.calls_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Override string wiring every key to the fake tools. Overrides win over
    /// whatever CC/LINKER/... the test environment happens to export.
    pub fn overrides(&self) -> String {
        let cc = self.bin_dir().join("fakecc");
        let ld = self.bin_dir().join("fakeld");
        [
            format!("RUN_DIR={}", self.run_dir().display()),
            "OMP_NUM_THREADS=3".to_string(),
            format!("CC={}", cc.display()),
            "CFLAGS=-O2 -g".to_string(),
            format!("CXX={}", cc.display()),
            "CXXFLAGS=-O2".to_string(),
            format!("FC={}", cc.display()),
            "FCFLAGS=".to_string(),
            format!("LINKER={}", ld.display()),
            "PRELINKFLAGS=-fopenmp".to_string(),
            "POSTLINKFLAGS=-lm".to_string(),
            "MPIEXEC=env".to_string(),
            "MPIEXECFLAGS=".to_string(),
            "VERBOSE=no".to_string(),
        ]
        .join(":")
    }

    pub fn write_config(&self, text: &str) {
        fs::write(self.config_path(), text).unwrap();
    }

    pub fn source(&self, name: &str) -> PathBuf {
        let path = self.run_dir().join(name);
        fs::write(&path, "int main(void) { return 0; }\n").unwrap();
        path
    }
}

/// `Execution of the program took d.ddddE±dd seconds`
pub fn is_timing_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("Execution of the program took ") else {
        return false;
    };
    let Some(num) = rest.strip_suffix(" seconds") else {
        return false;
    };
    let b = num.as_bytes();
    b.len() == 10
        && b[0].is_ascii_digit()
        && b[1] == b'.'
        && b[2..6].iter().all(u8::is_ascii_digit)
        && b[6] == b'E'
        && (b[7] == b'+' || b[7] == b'-')
        && b[8..10].iter().all(u8::is_ascii_digit)
}

pub fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}
