//! Binding of surfaces to drawing targets.
//!
//! The registry guarantees at most one [`Surface`] per target key. Binding
//! an already-bound key hands back the existing surface; the target
//! factory (validation plus context creation) only runs for new keys.

use crate::clock::AnimationClock;
use crate::context::DrawContext;
use crate::error::BindError;
use crate::id::SurfaceId;
use crate::model::SurfaceOptions;
use crate::surface::Surface;
use std::collections::HashMap;

/// A validated drawing target, ready to become a surface.
pub struct BindTarget<C> {
    pub context: C,
    pub width: u32,
    pub height: u32,
}

pub struct SurfaceRegistry<C: DrawContext + 'static> {
    clock: AnimationClock,
    surfaces: HashMap<SurfaceId, Surface<C>>,
}

impl<C: DrawContext + 'static> SurfaceRegistry<C> {
    /// Registry whose surfaces all share `clock`.
    pub fn new(clock: AnimationClock) -> Self {
        Self {
            clock,
            surfaces: HashMap::new(),
        }
    }

    /// Surface bound to `id`, creating it from `target()` on first bind.
    ///
    /// On a repeated bind `options` are ignored and `target` is not called.
    /// A failing `target` leaves the registry unchanged.
    pub fn bind<F>(
        &mut self,
        id: SurfaceId,
        options: SurfaceOptions,
        target: F,
    ) -> Result<Surface<C>, BindError>
    where
        F: FnOnce() -> Result<BindTarget<C>, BindError>,
    {
        if let Some(existing) = self.surfaces.get(&id) {
            log::trace!("surface {id} already bound");
            return Ok(existing.clone());
        }

        let BindTarget {
            context,
            width,
            height,
        } = target()?;
        let surface = Surface::new(context, width, height, options, self.clock.clone());
        log::debug!("bound surface {id} ({width}x{height})");
        self.surfaces.insert(id, surface.clone());
        Ok(surface)
    }

    pub fn get(&self, id: SurfaceId) -> Option<Surface<C>> {
        self.surfaces.get(&id).cloned()
    }

    /// Drop the binding. The surface is stopped; outstanding handles stay
    /// usable but are no longer reachable through the registry.
    pub fn unbind(&mut self, id: SurfaceId) -> Option<Surface<C>> {
        let surface = self.surfaces.remove(&id)?;
        surface.stop();
        log::debug!("unbound surface {id}");
        Some(surface)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualFrameHost;
    use crate::record::RecordingContext;

    fn registry() -> SurfaceRegistry<RecordingContext> {
        SurfaceRegistry::new(AnimationClock::new(ManualFrameHost::new()))
    }

    fn canvas(width: u32, height: u32) -> Result<BindTarget<RecordingContext>, BindError> {
        Ok(BindTarget {
            context: RecordingContext::new(),
            width,
            height,
        })
    }

    #[test]
    fn rebind_returns_same_surface() {
        let mut reg = registry();
        let id = SurfaceId::intern("rebind");
        let a = reg.bind(id, SurfaceOptions::default(), || canvas(300, 150)).unwrap();
        let b = reg
            .bind(id, SurfaceOptions::default(), || panic!("factory must not run twice"))
            .unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn failed_bind_registers_nothing() {
        let mut reg = registry();
        let id = SurfaceId::intern("not-a-canvas");
        let err = reg
            .bind(id, SurfaceOptions::default(), || Err(BindError::NotACanvas))
            .unwrap_err();
        assert!(matches!(err, BindError::NotACanvas));
        assert!(reg.is_empty());
        assert!(reg.get(id).is_none());
    }

    #[test]
    fn distinct_targets_get_distinct_surfaces() {
        let mut reg = registry();
        let a = reg
            .bind(SurfaceId::intern("left"), SurfaceOptions::default(), || canvas(10, 10))
            .unwrap();
        let b = reg
            .bind(SurfaceId::intern("right"), SurfaceOptions::default(), || canvas(20, 20))
            .unwrap();
        assert!(!a.ptr_eq(&b));
        assert_eq!(b.width(), 20);
    }

    #[test]
    fn unbind_stops_and_forgets() {
        let mut reg = registry();
        let id = SurfaceId::intern("gone");
        let s = reg.bind(id, SurfaceOptions::default(), || canvas(5, 5)).unwrap();
        s.start().unwrap();
        let removed = reg.unbind(id).unwrap();
        assert!(removed.ptr_eq(&s));
        assert!(!s.is_running());
        assert!(reg.get(id).is_none());
        assert!(reg.unbind(id).is_none());
    }
}
