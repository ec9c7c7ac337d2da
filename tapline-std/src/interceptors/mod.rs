//! Ready-made interceptors.

mod closure;
mod logging;

pub use closure::FnInterceptor;
pub use logging::LoggingInterceptor;
