/// Contract for the location-acquisition subsystem that feeds the tracker.
///
/// Implementations must treat every call idempotently: the tracker re-issues
/// `request_authorization` and `activate` on each start.
pub trait FixSource {
    fn request_authorization(&mut self);
    fn activate(&mut self);
    fn deactivate(&mut self);
}

/// Source with no activation surface, for streams pushed from elsewhere
/// (file replays, the HTTP bridge).
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveSource;

impl FixSource for PassiveSource {
    fn request_authorization(&mut self) {}

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}
}

impl<S: FixSource + ?Sized> FixSource for Box<S> {
    fn request_authorization(&mut self) {
        (**self).request_authorization();
    }

    fn activate(&mut self) {
        (**self).activate();
    }

    fn deactivate(&mut self) {
        (**self).deactivate();
    }
}
