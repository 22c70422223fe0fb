//! Running the typesetting engine

use crate::config::CompilerConfig;
use crate::staging::Staging;
use crate::{Result, TypesetError};
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Name the source is written to inside the staging directory
pub const SOURCE_FILE: &str = "document.tex";
/// Name the engine is expected to write its PDF to
pub const OUTPUT_FILE: &str = "document.pdf";
/// Engine stderr is captured here
pub const STDERR_LOG: &str = "typeset-stderr.log";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Why a compile call produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptySource,
}

/// Outcome of [`Compiler::compile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled {
    /// The PDF bytes written by the engine
    Produced(Vec<u8>),
    /// Nothing was run
    Skipped(SkipReason),
}

impl Compiled {
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Produced(bytes) => Some(bytes),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_produced(&self) -> bool {
        matches!(self, Self::Produced(_))
    }
}

/// Compiles ConTeXt source text to PDF
///
/// Each call gets its own staging directory, so one compiler can be shared
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `source`, making `auxiliaries` available next to it by base name
    ///
    /// Empty source skips the engine entirely and returns
    /// [`Compiled::Skipped`]. On success the staging directory is removed.
    /// On engine failure, timeout or missing output it is kept and its path
    /// is part of the error.
    pub fn compile<P: AsRef<Path>>(&self, source: &str, auxiliaries: &[P]) -> Result<Compiled> {
        if source.is_empty() {
            log::warn!("Source is empty, not creating a PDF");
            return Ok(Compiled::Skipped(SkipReason::EmptySource));
        }
        self.run(source, auxiliaries).map(Compiled::Produced)
    }

    /// Like [`Compiler::compile`], but empty source is an error
    pub fn compile_required<P: AsRef<Path>>(
        &self,
        source: &str,
        auxiliaries: &[P],
    ) -> Result<Vec<u8>> {
        if source.is_empty() {
            return Err(TypesetError::EmptySource);
        }
        self.run(source, auxiliaries)
    }

    fn run<P: AsRef<Path>>(&self, source: &str, auxiliaries: &[P]) -> Result<Vec<u8>> {
        let staging = Staging::create(&self.config.staging_root(), source)?;
        for auxiliary in auxiliaries {
            staging.link(auxiliary.as_ref())?;
        }

        if let Err(err) = self.invoke(staging.path()) {
            let kept = staging.keep();
            log::error!("{} (staging directory {})", err, kept.display());
            return Err(err);
        }

        let bytes = match fs::read(staging.path().join(OUTPUT_FILE)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let staging = staging.keep();
                log::error!("{} missing in {}", OUTPUT_FILE, staging.display());
                return Err(TypesetError::MissingOutput { staging });
            }
            Err(err) => return Err(err.into()),
        };

        staging.remove()?;
        log::info!("Typeset {} bytes of PDF", bytes.len());
        Ok(bytes)
    }

    /// Run the engine in `dir` and wait for it, honouring the timeout
    fn invoke(&self, dir: &Path) -> Result<()> {
        let program = &self.config.program;
        log::debug!("Running {} {:?} in {}", program, self.config.args, dir.display());

        let lost = |source| TypesetError::Invoke {
            staging: dir.to_path_buf(),
            source,
        };

        let stderr = File::create(dir.join(STDERR_LOG)).map_err(lost)?;
        let mut command = Command::new(program);
        command
            .args(&self.config.args)
            .arg(SOURCE_FILE)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr));
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // The engine leads a new process group, see `kill_engine`
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| TypesetError::Spawn {
            program: program.clone(),
            staging: dir.to_path_buf(),
            source,
        })?;

        let status = match self.config.timeout() {
            Some(timeout) => match wait_with_timeout(&mut child, timeout).map_err(lost)? {
                Some(status) => status,
                None => {
                    return Err(TypesetError::TimedOut {
                        timeout,
                        staging: dir.to_path_buf(),
                    })
                }
            },
            None => child.wait().map_err(lost)?,
        };

        if !status.success() {
            return Err(TypesetError::Failed {
                code: status.code(),
                staging: dir.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Wait for `child` up to `timeout`; kill it and return `None` when exceeded
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            if let Err(err) = kill_engine(child) {
                log::warn!("Could not kill timed out engine: {}", err);
            }
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the engine together with every process it started
///
/// `context` runs the actual typesetting in a `luametatex` child, so
/// killing only the direct child would leave that one running.
#[cfg(unix)]
fn kill_engine(child: &mut Child) -> io::Result<()> {
    let group = libc::pid_t::try_from(child.id())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "engine pid out of range"))?;
    // SAFETY: killpg takes no pointers; `group` is the pid of our own child,
    // which is also its process group id
    if unsafe { libc::killpg(group, libc::SIGKILL) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn kill_engine(child: &mut Child) -> io::Result<()> {
    child.kill()
}
