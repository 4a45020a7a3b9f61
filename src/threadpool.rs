//! Thin collaborator over `rayon`'s thread pool (spec section 6's external
//! interface for submitting chunked work, spec section 5's concurrency
//! model). The crate never talks to `rayon::Scope` directly outside this
//! module, so the chunked division protocol in `division.rs` reads as pool
//! submit/wait calls rather than a rayon-specific API.

/// A fixed-size worker pool. Wraps `rayon::ThreadPool` rather than spawning
/// raw OS threads, matching how the rest of the crate's concurrency is
/// built on `rayon`.
pub struct ThreadPool {
    inner: rayon::ThreadPool,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Self {
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .build()
            .expect("failed to build thread pool");
        ThreadPool { inner }
    }

    /// Runs `f` with a `Scope` that can submit work; blocks until every
    /// submitted task has completed (rayon's scope barrier).
    pub fn scope<F>(&self, f: F)
    where
        F: for<'a> FnOnce(&Scope<'a>),
    {
        self.inner.scope(|s| {
            let scope = Scope { inner: s };
            f(&scope)
        });
    }
}

/// A handle for submitting work inside a `ThreadPool::scope` call.
pub struct Scope<'a> {
    inner: &'a rayon::Scope<'a>,
}

impl<'a> Scope<'a> {
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'a,
    {
        self.inner.spawn(move |_| task());
    }
}
