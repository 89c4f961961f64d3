use crate::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SurfaceKind {
    /// A window's client area.
    Window,
    /// A memory device context with a bitmap selected into it.
    Memory,
    Printer,
    EnhancedMetafile,
}

/// The pixel destination a context is created for.
///
/// Surfaces come from the windowing layer; a context only asks them for their
/// current client size, which is how resizes are noticed.
pub trait Surface {
    fn kind(&self) -> SurfaceKind;
    fn client_size(&self) -> Size<u32>;
}
