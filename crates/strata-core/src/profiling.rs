//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are always compiled in and cost a single atomic load while
//! profiling is off. The `profiling` feature adds an HTTP server for
//! `puffin_viewer`.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Record scopes in-process only.
    InProcess,
    /// Send profiling data to puffin_viewer via HTTP.
    #[cfg(feature = "profiling")]
    PuffinHttp,
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: std::sync::OnceLock<puffin_http::Server> = std::sync::OnceLock::new();

/// Enables scope recording and starts the requested backend.
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);
    match backend {
        ProfilingBackend::InProcess => {
            tracing::debug!("puffin scopes enabled");
        }
        #[cfg(feature = "profiling")]
        ProfilingBackend::PuffinHttp => match puffin_http::Server::new("0.0.0.0:8585") {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        },
    }
}

/// Mark the start of a new frame for profiling.
///
/// Call this once per host frame, before driving the panel runtime.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
