//! Discovery of Kustomize directories and concurrent build scheduling.
//!
//! The tree is walked on a blocking thread. Every directory holding a
//! `kustomization.yaml`/`kustomization.yml` is handed to a coordinator task,
//! which spawns one build per directory. Results flow back through an
//! unbounded channel in completion order. The channel closes once the walk
//! has finished and every spawned build has delivered.
//!
//! [`Discovery::shutdown`] cancels outstanding builds and waits until their
//! tasks are gone, so executors that own a child process get to kill it.

use crate::validator::kustomize::BuildExecutor;
use crate::validator::types::BuildResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use walkdir::WalkDir;

/// File names that mark a directory as a Kustomize build root.
pub const KUSTOMIZATION_FILES: &[&str] = &["kustomization.yaml", "kustomization.yml"];

/// Scheduling knobs for [`discover`].
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Maximum builds running at once, `None` for no limit.
    pub max_parallel: Option<usize>,
}

/// Stream of build results for a directory tree.
///
/// Dropping the stream aborts the coordinator without waiting; use
/// [`Discovery::shutdown`] to be sure unfinished builds are torn down.
pub struct Discovery {
    results: mpsc::UnboundedReceiver<BuildResult>,
    coordinator: JoinHandle<()>,
    cancel: Option<oneshot::Sender<()>>,
    scheduled: Arc<AtomicUsize>,
}

impl Discovery {
    /// Next build result, or `None` once all builds have reported.
    pub async fn next(&mut self) -> Option<BuildResult> {
        self.results.recv().await
    }

    /// Number of directories scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Cancel every unfinished build and wait until their tasks have been
    /// dropped. Returns immediately if all builds already reported.
    pub async fn shutdown(mut self) {
        if let Some(cancel) = self.cancel.take() {
            // Err means the coordinator already returned.
            let _ = cancel.send(());
        }
        if let Err(e) = (&mut self.coordinator).await
            && e.is_panic()
        {
            log::warn!("build coordinator panicked: {}", e);
        }
    }

    /// Drain the stream into a vector.
    pub async fn collect(mut self) -> Vec<BuildResult> {
        let mut results = Vec::new();
        while let Some(result) = self.next().await {
            results.push(result);
        }
        results
    }
}

impl Drop for Discovery {
    fn drop(&mut self) {
        self.coordinator.abort();
    }
}

/// Whether `path` names a kustomization file.
pub fn is_kustomization_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| KUSTOMIZATION_FILES.contains(&name))
}

/// Walk `root` and build every Kustomize directory found beneath it.
///
/// Must be called from within a tokio runtime.
pub fn discover<E: BuildExecutor>(
    root: impl Into<PathBuf>,
    executor: Arc<E>,
    options: DiscoverOptions,
) -> Discovery {
    let root = root.into();
    let (dir_tx, dir_rx) = mpsc::unbounded_channel::<PathBuf>();
    let (result_tx, result_rx) = mpsc::unbounded_channel::<BuildResult>();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let scheduled = Arc::new(AtomicUsize::new(0));

    let walker = tokio::task::spawn_blocking(move || walk(&root, &dir_tx));

    let coordinator = tokio::spawn(coordinate(
        dir_rx,
        result_tx,
        executor,
        options.max_parallel.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        Arc::clone(&scheduled),
        walker,
        cancel_rx,
    ));

    Discovery {
        results: result_rx,
        coordinator,
        cancel: Some(cancel_tx),
        scheduled,
    }
}

/// Blocking traversal; sends each Kustomize directory as it is found.
fn walk(root: &Path, dirs: &mpsc::UnboundedSender<PathBuf>) {
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() || !is_kustomization_file(entry.path()) {
            continue;
        }

        let dir = entry
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!("found kustomization in {}", dir.display());

        if dirs.send(dir).is_err() {
            // Receiver gone: the run was abandoned.
            return;
        }
    }
}

async fn coordinate<E: BuildExecutor>(
    mut dirs: mpsc::UnboundedReceiver<PathBuf>,
    results: mpsc::UnboundedSender<BuildResult>,
    executor: Arc<E>,
    limit: Option<Arc<Semaphore>>,
    scheduled: Arc<AtomicUsize>,
    walker: JoinHandle<()>,
    mut cancel: oneshot::Receiver<()>,
) {
    // Owning the set means aborting this task aborts every build in it.
    let mut builds = JoinSet::new();

    loop {
        let dir = tokio::select! {
            _ = &mut cancel => {
                // Dropping `dirs` also stops the walk at its next send.
                cancel_builds(&mut builds).await;
                return;
            }
            dir = dirs.recv() => match dir {
                Some(dir) => dir,
                None => break,
            },
        };

        scheduled.fetch_add(1, Ordering::SeqCst);
        let executor = Arc::clone(&executor);
        let results = results.clone();
        let limit = limit.clone();

        builds.spawn(async move {
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            let result = executor.execute(dir).await;
            // The consumer may have stopped listening; nothing to do then.
            let _ = results.send(result);
        });
    }

    if let Err(e) = walker.await {
        log::warn!("directory walk ended abnormally: {}", e);
    }

    // Our sender goes away here; the channel closes once the builds finish.
    drop(results);

    loop {
        tokio::select! {
            _ = &mut cancel => {
                cancel_builds(&mut builds).await;
                return;
            }
            joined = builds.join_next() => match joined {
                Some(Err(e)) if e.is_panic() => log::warn!("build task panicked: {}", e),
                Some(_) => {}
                None => return,
            },
        }
    }
}

/// Abort every build and wait for the tasks to be dropped.
async fn cancel_builds(builds: &mut JoinSet<()>) {
    if !builds.is_empty() {
        log::debug!("cancelling {} unfinished build(s)", builds.len());
    }
    builds.shutdown().await;
}
