#![allow(unsafe_code)]

use windows::Win32::Graphics::Direct2D::{
    D2D1CreateFactory, ID2D1Factory, D2D1_FACTORY_TYPE_MULTI_THREADED,
};

use crate::error::{GuiError, Result};

/// Process-wide Direct2D factory.
///
/// Created by `Application::init` and released when dropped, which
/// `Application::deinit` does.  Multi-threaded because the application owns it
/// on the caller's thread while renderers draw on the loop thread.
#[derive(Debug)]
pub struct DrawingFactory {
    factory: ID2D1Factory,
}

impl DrawingFactory {
    /// The underlying factory, for renderers that create render targets.
    pub fn d2d(&self) -> &ID2D1Factory {
        &self.factory
    }
}

pub(crate) fn create_drawing_factory() -> Result<DrawingFactory> {
    // SAFETY: No options pointer is passed; the returned interface is owned
    // and released on drop.
    let factory: ID2D1Factory = unsafe { D2D1CreateFactory(D2D1_FACTORY_TYPE_MULTI_THREADED, None) }
        .map_err(|e| GuiError::windows("D2D1CreateFactory", e))?;
    Ok(DrawingFactory { factory })
}
