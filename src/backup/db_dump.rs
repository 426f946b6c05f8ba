// dirttool/src/backup/db_dump.rs
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::config::ConnectionConfig;
use crate::errors::Result;

/// Fixed pg_dump options for a self-contained, human-readable restore script.
///
/// `--create --clean --if-exists` makes the script open with
/// `DROP DATABASE IF EXISTS` / `CREATE DATABASE`, and `--inserts` writes one
/// INSERT per row instead of COPY blocks.
pub const PG_DUMP_OPTIONS: [&str; 8] = [
    "--format=plain",
    "--create",
    "--clean",
    "--if-exists",
    "--inserts",
    "--blobs",
    "--encoding=UTF8",
    "--verbose",
];

/// A fully resolved pg_dump command line.
#[derive(Clone)]
pub struct DumpInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub artifact: PathBuf,
    password: String,
}

impl fmt::Debug for DumpInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("artifact", &self.artifact)
            .finish_non_exhaustive()
    }
}

impl DumpInvocation {
    pub fn new(program: &Path, connection: &ConnectionConfig, artifact: &Path) -> Self {
        let mut args: Vec<OsString> = PG_DUMP_OPTIONS.iter().map(OsString::from).collect();
        args.extend(connection.libpq_args().into_iter().map(OsString::from));

        let mut file_arg = OsString::from("--file=");
        file_arg.push(artifact.as_os_str());
        args.push(file_arg);

        DumpInvocation {
            program: program.to_path_buf(),
            args,
            artifact: artifact.to_path_buf(),
            password: connection.password.clone(),
        }
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("PGPASSWORD", &self.password)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            // --verbose progress goes to the invoking terminal.
            .stderr(Stdio::inherit());
        command
    }
}

/// Runs a dump to completion and reports how it exited.
pub trait DumpRunner {
    fn run(&self, invocation: &DumpInvocation) -> Result<ExitStatus>;
}

/// Spawns the real pg_dump and blocks until it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgDump;

impl DumpRunner for PgDump {
    fn run(&self, invocation: &DumpInvocation) -> Result<ExitStatus> {
        debug!(?invocation, "spawning pg_dump");
        let status = invocation.to_command().status()?;
        Ok(status)
    }
}
