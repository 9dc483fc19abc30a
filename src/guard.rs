//! Debug-only guard against nested entry into a table.
//!
//! Tables call user `Eq`/`KeyBytes` code while probing and while an eviction
//! chain holds an entry outside both arrays. A key whose `Eq` impl calls
//! back into the same table would observe that transient state. In debug
//! builds the guard panics on such nesting and names both operations; in
//! release builds it compiles away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct ProbeGuard {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Tables are single-threaded; keep the guard !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl ProbeGuard {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Marks `op` as running until the returned token is dropped.
    #[inline]
    pub fn enter(&self, op: &'static str) -> Active<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant table access: `{op}` called during `{outer}`");
            }
            self.active.set(Some(op));
            Active { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            Active { _z: PhantomData }
        }
    }
}

impl Default for ProbeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProbeGuard {
    // A cloned table starts outside any operation.
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct Active<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeGuard,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for Active<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(None);
    }
}
