#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use flyq_framework::{Console, Framework};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn folder_to_use() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("flyq_test_")
        .tempdir()
        .expect("failed to create temp dir")
}

/// In-memory stand-in for stdout.
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn console(&self) -> Console {
        let sink = self.clone();
        Console::from_fn(move || sink.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("log output is not utf-8")
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A framework whose stdout sink is captured, so tests stay quiet.
pub fn captured_framework() -> (Framework, CapturedOutput) {
    let output = CapturedOutput::default();
    (Framework::with_console(output.console()), output)
}
