use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use gcscore::GcsContext;

use crate::error;
use crate::types::GcsContextHandle;

static CONTEXTS: OnceLock<Mutex<HashMap<GcsContextHandle, Arc<GcsContext>>>> = OnceLock::new();
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn contexts() -> MutexGuard<'static, HashMap<GcsContextHandle, Arc<GcsContext>>> {
    CONTEXTS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn insert(context: GcsContext) -> GcsContextHandle {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    contexts().insert(handle, Arc::new(context));
    handle
}

pub(crate) fn get(handle: GcsContextHandle) -> Option<Arc<GcsContext>> {
    contexts().get(&handle).cloned()
}

pub(crate) fn remove(handle: GcsContextHandle) -> Option<Arc<GcsContext>> {
    contexts().remove(&handle)
}

/// Run `f` against a registered context. The registry lock is not held while
/// `f` runs, so callbacks fired from `f` may call back into this library.
pub(crate) fn with_context<T>(
    handle: GcsContextHandle,
    on_error: T,
    f: impl FnOnce(&GcsContext) -> T,
) -> T {
    match get(handle) {
        Some(context) => f(&context),
        None => {
            let _ = error::set_invalid_handle(handle);
            on_error
        }
    }
}
