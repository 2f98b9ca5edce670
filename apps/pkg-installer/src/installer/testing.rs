//! Scripted [`CommandRunner`] for unit tests.

use std::ffi::OsStr;
use std::io;
use std::sync::Mutex;

use crate::installer::{CapturedOutput, CommandRunner};

#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    missing: Vec<String>,
    captured: CapturedOutput,
    lines: Vec<String>,
    code: Option<i32>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    /// Programs that behave as if absent from `PATH`
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn captured(mut self, code: Option<i32>, stdout: &str, stderr: &str) -> Self {
        self.captured = CapturedOutput {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        };
        self
    }

    pub fn streamed(mut self, lines: &[&str], code: Option<i32>) -> Self {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self.code = code;
        self
    }

    /// Every invocation so far, as `program arg arg`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&OsStr]) -> io::Result<()> {
        let mut call = program.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(&arg.to_string_lossy());
        }
        self.calls.lock().unwrap().push(call);

        if self.missing.iter().any(|m| m == program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: not found"),
            ));
        }
        Ok(())
    }
}

impl CommandRunner for FakeRunner {
    fn capture(&self, program: &str, args: &[&OsStr]) -> io::Result<CapturedOutput> {
        self.record(program, args)?;
        Ok(self.captured.clone())
    }

    fn stream(
        &self,
        program: &str,
        args: &[&OsStr],
        on_line: &mut dyn FnMut(String),
    ) -> io::Result<Option<i32>> {
        self.record(program, args)?;
        for line in &self.lines {
            on_line(line.clone());
        }
        Ok(self.code)
    }
}
