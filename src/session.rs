//! Observable viewer state.
//!
//! Every change publishes a complete new [`ViewState`] with a bumped version; readers holding an
//! older snapshot are never affected. Package loads run on a background thread and only publish
//! once the index is fully built.

use std::any::Any;
use std::fs::File;
use std::io::{self, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use crate::{
    config::ViewerConfig,
    dex::{ClassDecoder, MethodRef},
    index::ClassIndex,
    manifest::app_class_prefix,
    smali::RenderedClass,
    LoadError, Package,
};

/// Where the bytes of a package come from
pub enum PackageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl PackageSource {
    fn read(self) -> io::Result<Vec<u8>> {
        match self {
            PackageSource::Path(path) => {
                let mut buf = Vec::new();
                File::open(path)?.read_to_end(&mut buf)?;
                Ok(buf)
            }
            PackageSource::Bytes(buf) => Ok(buf),
            PackageSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// A package the user picked
    Selected,
    /// The bundled package opened at startup
    Sample,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub version: u64,
    pub loading: bool,
    pub query: String,
    pub index: Arc<ClassIndex>,
    pub selected: Option<String>,
    pub error: Option<String>,
    pub summary: String,
}

/// What the class list should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<'a> {
    Loading,
    Failed(&'a str),
    /// The package loaded but holds no classes
    NoClasses,
    NoMatches,
    Showing(usize),
}

impl ViewState {
    /// The query-filtered class list
    pub fn classes(&self) -> Vec<&RenderedClass> {
        self.index.filter(&self.query)
    }

    pub fn selected_class(&self) -> Option<&RenderedClass> {
        self.selected
            .as_deref()
            .and_then(|name| self.index.resolve_by_name(name))
    }

    pub fn status(&self) -> Status<'_> {
        if self.loading {
            return Status::Loading;
        }
        if let Some(error) = &self.error {
            return Status::Failed(error);
        }
        if self.index.is_empty() {
            return Status::NoClasses;
        }
        match self.classes().len() {
            0 => Status::NoMatches,
            n => Status::Showing(n),
        }
    }
}

#[derive(Default)]
struct Shared {
    state: RwLock<Arc<ViewState>>,
    subscribers: Mutex<Vec<Sender<Arc<ViewState>>>>,
}

impl Shared {
    fn snapshot(&self) -> Arc<ViewState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in the state derived from the current one and notify subscribers
    fn publish(&self, next: impl FnOnce(&ViewState) -> ViewState) -> Arc<ViewState> {
        self.try_publish(|state| Some(next(state)))
            .unwrap_or_else(|| self.snapshot())
    }

    /// Like [`Shared::publish`], but `next` may return `None` to leave the state untouched
    fn try_publish(
        &self,
        next: impl FnOnce(&ViewState) -> Option<ViewState>,
    ) -> Option<Arc<ViewState>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut new_state = next(&state)?;
        new_state.version = state.version + 1;
        let new_state = Arc::new(new_state);
        *state = new_state.clone();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(new_state.clone()).is_ok());
        Some(new_state)
    }
}

/// A load running in the background
pub struct LoadHandle {
    handle: JoinHandle<Arc<ViewState>>,
}

impl LoadHandle {
    /// Block until the load has published its final state
    pub fn wait(self) -> thread::Result<Arc<ViewState>> {
        self.handle.join()
    }
}

pub struct Session {
    decoder: Arc<dyn ClassDecoder>,
    config: ViewerConfig,
    shared: Arc<Shared>,
}

impl Session {
    pub fn new(decoder: Arc<dyn ClassDecoder>, config: ViewerConfig) -> Self {
        Self {
            decoder,
            config,
            shared: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.shared.snapshot()
    }

    /// Receive every state published from now on
    pub fn subscribe(&self) -> Receiver<Arc<ViewState>> {
        let (tx, rx) = mpsc::channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Load a package in the background. On success the whole state is replaced; on failure only
    /// `loading` and `error` change. A panic while loading counts as a failure.
    pub fn open_package(&self, source: PackageSource, kind: LoadKind) -> LoadHandle {
        let decoder = self.decoder.clone();
        let shared = self.shared.clone();
        let app_classes_only = self.config.app_classes_only;
        self.shared.publish(|state| ViewState {
            loading: true,
            error: None,
            ..state.clone()
        });
        let handle = thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                source
                    .read()
                    .map_err(LoadError::from)
                    .and_then(|buf| crate::load(&buf, decoder.as_ref()))
                    .map_err(|e| e.to_string())
            }))
            .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
            match result {
                Ok(package) => {
                    let (index, summary) = summarize(package, kind, app_classes_only);
                    info!("{summary}");
                    shared.publish(|_| ViewState {
                        selected: index.classes().first().map(|c| c.class_name.clone()),
                        index: Arc::new(index),
                        summary,
                        ..Default::default()
                    })
                }
                Err(e) => {
                    error!("{e}");
                    shared.publish(|state| ViewState {
                        loading: false,
                        error: Some(e),
                        ..state.clone()
                    })
                }
            }
        });
        LoadHandle { handle }
    }

    pub fn set_query(&self, query: &str) -> Arc<ViewState> {
        self.shared.publish(|state| ViewState {
            query: query.into(),
            ..state.clone()
        })
    }

    /// Select a class by exact name. Unknown names leave the selection unchanged.
    pub fn select_class(&self, name: &str) -> bool {
        self.shared
            .try_publish(|state| {
                state.index.resolve_by_name(name)?;
                Some(ViewState {
                    selected: Some(name.into()),
                    ..state.clone()
                })
            })
            .is_some()
    }

    /// Navigate to the class called on `line` of the selected class
    pub fn follow_reference(&self, line: usize) -> Option<MethodRef> {
        let state = self.snapshot();
        let target = state.selected_class()?.reference_at(line)?.clone();
        self.select_class(&target.defining_class).then_some(target)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let reason = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("Load panicked: {reason}")
}

fn summarize(package: Package, kind: LoadKind, app_classes_only: bool) -> (ClassIndex, String) {
    let Package {
        package_name,
        index,
    } = package;
    match (kind, package_name) {
        (LoadKind::Selected, _) => {
            let summary = format!("Selected package: {} classes", index.len());
            (index, summary)
        }
        (LoadKind::Sample, Some(package_name)) if app_classes_only => {
            let all = index.len();
            let index = index.retain_prefix(&app_class_prefix(&package_name));
            let summary = format!(
                "Sample package: {} app classes / {all} classes in package",
                index.len()
            );
            (index, summary)
        }
        (LoadKind::Sample, package_name) => {
            if app_classes_only && package_name.is_none() {
                warn!("No manifest package, showing every class of the sample");
            }
            let summary = format!("Sample package: {} classes", index.len());
            (index, summary)
        }
    }
}
