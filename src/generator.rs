//! The external critical CSS generator and the subprocess that drives it.

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::options::GenerationOptions;

/// Reads options as JSON on stdin and hands them to the `critical` package.
const NODE_RUNNER: &str = "\
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', () => {
  const critical = require('critical');
  Promise.resolve(critical.generate(JSON.parse(input))).then(
    () => process.exit(0),
    (err) => {
      console.error(String((err && err.message) || err));
      process.exit(1);
    },
  );
});
";

/// Failure reported by the generator for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct GenerationError(String);

impl GenerationError {
  /// Wrap a generator failure message.
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }

  /// The message reported by the generator.
  pub fn message(&self) -> &str {
    &self.0
  }
}

/// Something that renders a page and writes its critical CSS.
///
/// `generate` blocks until the page is finished; `Err` carries the failure.
pub trait CriticalGenerator {
  /// Generate critical CSS for one page.
  fn generate(&self, options: &GenerationOptions) -> Result<(), GenerationError>;
}

impl<G: CriticalGenerator + ?Sized> CriticalGenerator for &G {
  fn generate(&self, options: &GenerationOptions) -> Result<(), GenerationError> {
    (**self).generate(options)
  }
}

impl<G: CriticalGenerator + ?Sized> CriticalGenerator for Box<G> {
  fn generate(&self, options: &GenerationOptions) -> Result<(), GenerationError> {
    (**self).generate(options)
  }
}

/// Runs the `critical` npm package through a Node.js child process.
#[derive(Debug, Clone)]
pub struct NodeCritical {
  program: OsString,
  args: Vec<OsString>,
}

impl Default for NodeCritical {
  fn default() -> Self {
    Self::new("node")
  }
}

impl NodeCritical {
  /// Use the given Node.js executable with the built-in runner script.
  pub fn new(program: impl Into<OsString>) -> Self {
    Self {
      program: program.into(),
      args: vec!["-e".into(), NODE_RUNNER.into()],
    }
  }

  /// Use an arbitrary command that accepts the options as JSON on stdin.
  pub fn with_command<I, S>(program: impl Into<OsString>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }
}

impl CriticalGenerator for NodeCritical {
  fn generate(&self, options: &GenerationOptions) -> Result<(), GenerationError> {
    let payload = serde_json::to_vec(options)
      .map_err(|err| GenerationError::new(format!("failed to encode options: {err}")))?;

    let program = self.program.to_string_lossy();
    let mut child = Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|err| GenerationError::new(format!("failed to run `{program}`: {err}")))?;

    if let Some(mut stdin) = child.stdin.take() {
      // An early exit closes the pipe; the exit status below explains why.
      if let Err(err) = stdin.write_all(&payload)
        && err.kind() != ErrorKind::BrokenPipe
      {
        return Err(GenerationError::new(format!(
          "failed to send options to `{program}`: {err}"
        )));
      }
    }

    let output = child
      .wait_with_output()
      .map_err(|err| GenerationError::new(format!("failed to wait for `{program}`: {err}")))?;

    if output.status.success() {
      return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
      Err(GenerationError::new(format!(
        "`{program}` exited with {}",
        output.status
      )))
    } else {
      Err(GenerationError::new(stderr))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Map, json};

  fn options() -> GenerationOptions {
    let mut map = Map::new();
    map.insert("src".into(), json!("https://example.com/"));
    map.insert("target".into(), json!("index_critical.min.css"));
    GenerationOptions::from(map)
  }

  #[test]
  fn error_displays_generator_message() {
    let err = GenerationError::new("render failed");
    assert_eq!(err.to_string(), "render failed");
    assert_eq!(err.message(), "render failed");
  }

  #[test]
  fn missing_program_is_a_generation_error() {
    let generator = NodeCritical::new("definitely-not-a-real-node-binary");
    let err = generator.generate(&options()).unwrap_err();
    assert!(err.message().contains("definitely-not-a-real-node-binary"));
  }

  #[cfg(unix)]
  #[test]
  fn successful_exit_completes_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let received = dir.path().join("options.json");
    let script = format!("cat > '{}'", received.display());
    let generator = NodeCritical::with_command("sh", ["-c", script.as_str()]);

    generator.generate(&options()).unwrap();

    let written: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(received).unwrap()).unwrap();
    assert_eq!(written["src"], "https://example.com/");
    assert_eq!(written["target"], "index_critical.min.css");
  }

  #[cfg(unix)]
  #[test]
  fn failing_exit_reports_stderr() {
    let generator = NodeCritical::with_command("sh", [
      "-c",
      "cat > /dev/null; echo 'render failed' >&2; exit 3",
    ]);
    let err = generator.generate(&options()).unwrap_err();
    assert_eq!(err.message(), "render failed");
  }

  #[cfg(unix)]
  #[test]
  fn silent_failure_reports_exit_status() {
    let generator = NodeCritical::with_command("sh", ["-c", "cat > /dev/null; exit 2"]);
    let err = generator.generate(&options()).unwrap_err();
    assert!(err.message().starts_with("`sh` exited with"));
  }
}
