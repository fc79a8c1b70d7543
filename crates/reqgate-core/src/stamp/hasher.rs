use crate::errors::{ReqError, ReqResult};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces a content digest for a file on disk.
pub trait ContentHasher {
    /// Human-readable description for logs and error messages.
    fn describe(&self) -> String;

    fn digest(&self, path: &Path) -> ReqResult<String>;
}

/// Runs an external hashing script as `<interpreter> <script> <file>`.
///
/// The digest is the last non-empty line of stdout.
#[derive(Debug, Clone)]
pub struct ScriptHasher {
    script: PathBuf,
    interpreter: Option<String>,
}

impl ScriptHasher {
    /// `.py` scripts run through `python3`, `.sh` through `sh`; anything else
    /// is executed directly.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        let script = script.into();
        let interpreter = match script.extension().and_then(|e| e.to_str()) {
            Some("py") => Some("python3".to_string()),
            Some("sh") => Some("sh".to_string()),
            _ => None,
        };
        Self {
            script,
            interpreter,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    fn command_line(&self, target: &Path) -> String {
        match &self.interpreter {
            Some(i) => format!("{} {} {}", i, self.script.display(), target.display()),
            None => format!("{} {}", self.script.display(), target.display()),
        }
    }
}

impl ContentHasher for ScriptHasher {
    fn describe(&self) -> String {
        match &self.interpreter {
            Some(i) => format!("{} {}", i, self.script.display()),
            None => self.script.display().to_string(),
        }
    }

    fn digest(&self, path: &Path) -> ReqResult<String> {
        let command = self.command_line(path);
        let mut cmd = match &self.interpreter {
            Some(i) => {
                let mut c = Command::new(i);
                c.arg(&self.script);
                c
            }
            None => Command::new(&self.script),
        };
        let output = cmd.arg(path).output().map_err(|e| ReqError::HashTool {
            command: command.clone(),
            stdout: String::new(),
            stderr: String::new(),
            reason: format!("failed to spawn: {e}"),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ReqError::HashTool {
                command,
                stdout,
                stderr,
                reason: format!("exited with {}", output.status),
            });
        }

        match stdout.lines().map(str::trim).filter(|l| !l.is_empty()).last() {
            Some(digest) => Ok(digest.to_string()),
            None => Err(ReqError::HashTool {
                command,
                stdout,
                stderr,
                reason: "produced no output".into(),
            }),
        }
    }
}

/// In-process SHA-256 over the raw file bytes, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn describe(&self) -> String {
        "builtin sha256".to_string()
    }

    fn digest(&self, path: &Path) -> ReqResult<String> {
        let file = std::fs::File::open(path).map_err(|e| ReqError::io(path, e))?;
        sha256_hex_reader(file).map_err(|e| ReqError::io(path, e))
    }
}

pub(crate) fn sha256_hex_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_hex_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_hasher_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            Sha256Hasher.digest(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex_bytes(b"abc"), Sha256Hasher.digest(&path).unwrap());
    }

    #[test]
    fn python_scripts_get_an_interpreter() {
        let h = ScriptHasher::new("hashtag/hashtag_generator.py");
        assert_eq!(h.describe(), "python3 hashtag/hashtag_generator.py");
        let h = ScriptHasher::new("/usr/local/bin/hash-tool");
        assert_eq!(h.describe(), "/usr/local/bin/hash-tool");
    }

    #[cfg(unix)]
    #[test]
    fn script_digest_is_last_non_empty_stdout_line() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("FR-001.yaml");
        std::fs::write(&target, "id: FR-001\n").unwrap();

        let script = dir.path().join("hash.sh");
        std::fs::write(&script, "echo computing\necho deadbeef\necho\n").unwrap();
        let h = ScriptHasher::new(&script).with_interpreter("sh");
        assert_eq!(h.digest(&target).unwrap(), "deadbeef");
    }

    #[cfg(unix)]
    #[test]
    fn failing_script_reports_streams() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("FR-001.yaml");
        std::fs::write(&target, "id: FR-001\n").unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "echo partial\necho broken >&2\nexit 3\n").unwrap();

        let err = ScriptHasher::new(&script)
            .with_interpreter("sh")
            .digest(&target)
            .unwrap_err();
        match err {
            ReqError::HashTool { stdout, stderr, .. } => {
                assert!(stdout.contains("partial"));
                assert!(stderr.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn silent_script_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("FR-001.yaml");
        std::fs::write(&target, "id: FR-001\n").unwrap();
        let script = dir.path().join("quiet.sh");
        std::fs::write(&script, "exit 0\n").unwrap();

        let err = ScriptHasher::new(&script)
            .with_interpreter("sh")
            .digest(&target)
            .unwrap_err();
        assert!(err.to_string().contains("produced no output"));
    }
}
