//! Starter configuration written by `hpcmagic --init-config`.

use std::{fs, io, path::Path};

pub const DEFAULT_TEMPLATE: &str = r#"# hpcmagic configuration.
# Every key may be overridden by an environment variable of the same name,
# or per cell with --sysargs=KEY=value:KEY=value.
[DEFAULT]
# Where sources, objects, executables and logs are written
RUN_DIR = /tmp/hpcmagic

# Thread count handed to every compiled program
OMP_NUM_THREADS = 1

# C
CC = mpicc
CFLAGS = -O2 -g

# C++
CXX = mpicxx
CXXFLAGS = -O2 -g

# Fortran
FC = mpif90
FCFLAGS = -O2 -g

# Link step: LINKER PRELINKFLAGS objects -o program POSTLINKFLAGS
LINKER = mpicxx
PRELINKFLAGS =
POSTLINKFLAGS =

# Launcher: MPIEXEC MPIEXECFLAGS program args
MPIEXEC = mpiexec
MPIEXECFLAGS = -n 2

# Echo every tool invocation (yes/no)
VERBOSE = no
"#;

/// Write the template to `path`, creating parent directories.
pub fn write_template(path: &Path, force: bool) -> io::Result<()> {
    if path.exists() && !force {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force to overwrite)", path.display()),
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_TEMPLATE)
}
