use super::*;

/// Frame addressed by its `name` in the parent browsing context, e.g. the
/// `main` frame next to the sidebar frame.
#[derive(Debug, Clone)]
pub(super) struct NamedFrame {
    name: String,
}

impl NamedFrame {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn resolve(&self) -> Result<web_sys::Window, FrameError> {
        let window = web_sys::window().ok_or_else(|| FrameError::NotFound(self.name.clone()))?;
        // Without a parent the sidebar is the top-level page; look up the
        // frame from there.
        let context = window.parent().ok().flatten().unwrap_or(window);
        let frame = js_sys::Reflect::get(&context, &JsValue::from_str(&self.name))
            .map_err(|_| FrameError::NotFound(self.name.clone()))?;
        // Frames live in their own realm, so an instanceof check against
        // this realm's Window would always fail.
        let has_location = frame.is_object()
            && matches!(
                js_sys::Reflect::has(&frame, &JsValue::from_str("location")),
                Ok(true)
            );
        if !has_location {
            return Err(FrameError::NotFound(self.name.clone()));
        }
        Ok(frame.unchecked_into::<web_sys::Window>())
    }
}

impl FrameReloader for NamedFrame {
    fn name(&self) -> &str {
        &self.name
    }

    fn reload(&self) -> Result<(), FrameError> {
        let frame = self.resolve()?;
        frame.location().reload().map_err(|error| FrameError::Reload {
            name: self.name.clone(),
            message: error
                .as_string()
                .unwrap_or_else(|| "location.reload rejected".to_string()),
        })
    }
}
