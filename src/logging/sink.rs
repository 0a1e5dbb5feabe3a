use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

use super::{Logger, LoggerSettings};
use crate::error::{Error, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;
type MakeConsole = dyn Fn() -> Box<dyn Write + Send> + Send + Sync;

/// Target of the standard-output sink.
///
/// [`Console::stdout`] in production; tests hand in a buffer through
/// [`Console::from_fn`].
#[derive(Clone)]
pub struct Console {
    make: Arc<MakeConsole>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_fn(io::stdout)
    }

    pub fn from_fn<F, W>(make: F) -> Self
    where
        F: Fn() -> W + Send + Sync + 'static,
        W: Write + Send + 'static,
    {
        Self {
            make: Arc::new(move || Box::new(make()) as Box<dyn Write + Send>),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = Box<dyn Write + Send>;

    fn make_writer(&'a self) -> Self::Writer {
        (self.make)()
    }
}

/// Append-mode log file shared by every logger built from the same sinks.
#[derive(Debug, Clone)]
struct FileSink(Arc<File>);

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = &'a File;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}

/// The outputs one `configure_logger` run writes to.
pub(crate) struct Sinks {
    console: Option<Console>,
    stdout_json: bool,
    file: Option<FileSink>,
}

impl Sinks {
    pub(crate) fn open(settings: &LoggerSettings, console: &Console, silence: bool) -> Result<Self> {
        let file = match settings.file_path() {
            Some(path) => Some(FileSink(Arc::new(open_log_file(path)?))),
            None => None,
        };
        Ok(Self {
            console: (!silence).then(|| console.clone()),
            stdout_json: settings.stdout_json,
            file,
        })
    }

    pub(crate) fn logger(&self, name: &str, level: LevelFilter) -> Logger {
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if let Some(console) = &self.console {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(console.clone())
                .with_target(false);
            if self.stdout_json {
                layers.push(layer.json().with_filter(level).boxed());
            } else {
                layers.push(layer.compact().with_filter(level).boxed());
            }
        }

        if let Some(file) = &self.file {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(file.clone())
                    .with_ansi(false)
                    .with_filter(level)
                    .boxed(),
            );
        }

        Logger::from_subscriber(name, Registry::default().with(layers))
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    let io_error = |source: io::Error| Error::LoggerIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)
}
