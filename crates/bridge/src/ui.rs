use anyhow::Result;

/// The external UI subsystem, seen from the bridge.
///
/// `refresh` pumps pending native UI/input events and redraws. It is
/// synchronous and may invoke registered callbacks, any of which may
/// re-enter [`BridgeHandle::enqueue`](crate::BridgeHandle::enqueue) or
/// [`BridgeHandle::request_stop`](crate::BridgeHandle::request_stop)
/// mid-refresh. Widget creation, layout and event binding stay on the
/// implementor's side of this boundary.
pub trait UiSurface: Send {
    fn refresh(&mut self) -> Result<()>;
}
