//! Runs an external program on a page image and reads its stdout.
//!
//! The image is written to a temporary PNG whose path is appended as the
//! last argument. The program is expected to print JSON.

use std::ffi::{OsStr, OsString};
use std::process::Command;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::RasterImage;

/// A command line used to call out to an external engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBridge {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandBridge {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    /// Split a whitespace-separated command line into program and arguments.
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Bridge("empty engine command".to_string()))?;
        Ok(Self::new(program).with_args(parts))
    }

    pub fn with_arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Run on `image` and return raw stdout.
    pub fn run(&self, image: &RasterImage) -> Result<Vec<u8>> {
        let scratch = tempfile::Builder::new()
            .prefix("article-parser-")
            .suffix(".png")
            .tempfile()?;
        image.save_png(scratch.path())?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(scratch.path())
            .output()
            .map_err(|e| {
                Error::Bridge(format!(
                    "failed to invoke {}: {}",
                    self.program.to_string_lossy(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Bridge(format!(
                "{} exited with {}: {}",
                self.program.to_string_lossy(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    /// Run on `image` and decode stdout as JSON.
    pub fn run_json<T: DeserializeOwned>(&self, image: &RasterImage) -> Result<T> {
        let stdout = self.run(image)?;
        serde_json::from_slice(&stdout).map_err(|e| {
            Error::Bridge(format!(
                "{} printed invalid JSON: {}",
                self.program.to_string_lossy(),
                e
            ))
        })
    }
}
