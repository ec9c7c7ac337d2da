//! Standard hook families.
//!
//! Both families run their taps in series; they differ in which taps they
//! take and which conventions they can be invoked with.
//!
//! | family              | taps                  | invoke                          |
//! |---------------------|-----------------------|---------------------------------|
//! | [`SyncHook`]        | sync                  | `call`, `call_async`, `promise` |
//! | [`AsyncSeriesHook`] | sync, async, promise  | `call_async`, `promise`         |

mod async_series;
mod sync_hook;

pub use async_series::AsyncSeriesHook;
pub use sync_hook::SyncHook;
