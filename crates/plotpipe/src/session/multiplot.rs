//! Scoped multiplot layouts

use std::ops::{Deref, DerefMut};

use tracing::warn;

use super::Session;
use crate::core::Result;

/// Open multiplot layout that ends itself when dropped
///
/// Derefs to the [`Session`], so cells are drawn through the guard. Dropping it
/// writes `unset multiplot` once, unless the layout was already ended by
/// [`Session::end_multiplot`] or the guard was [released](Self::release). A
/// layout opened later through the guard is never closed by it.
///
/// ```rust
/// use plotpipe::{MemorySink, Series, SeriesOptions, Session};
///
/// let capture = MemorySink::new();
/// let mut session = Session::with_sink(capture.clone());
/// {
///     let mut layout = session.multiplot(1, 2).unwrap();
///     layout.draw(&[Series::plot([1.0, 2.0], SeriesOptions::new())]).unwrap();
///     layout.draw(&[Series::plot([2.0, 1.0], SeriesOptions::new())]).unwrap();
/// }
/// assert!(capture.contents().ends_with("unset multiplot\n"));
/// ```
pub struct MultiplotGuard<'a> {
    session: &'a mut Session,
    generation: u64,
    armed: bool,
}

impl<'a> MultiplotGuard<'a> {
    pub(super) fn new(session: &'a mut Session) -> Self {
        let generation = session.layout_generation;
        Self {
            session,
            generation,
            armed: true,
        }
    }

    /// Whether the layout this guard opened is still the open one
    fn owns_open_layout(&self) -> bool {
        self.session.is_multiplot() && self.session.layout_generation == self.generation
    }

    /// Disarm the guard; the layout stays open until ended explicitly
    pub fn release(&mut self) {
        self.armed = false;
    }

    /// End the layout now, reporting write errors
    pub fn finish(mut self) -> Result<()> {
        self.armed = false;
        if !self.owns_open_layout() {
            return Ok(());
        }
        self.session.end_multiplot()
    }
}

impl Deref for MultiplotGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for MultiplotGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for MultiplotGuard<'_> {
    fn drop(&mut self) {
        if !self.armed || !self.owns_open_layout() {
            return;
        }
        if let Err(e) = self.session.end_multiplot() {
            warn!(error = %e, "Failed to end multiplot");
        }
    }
}
