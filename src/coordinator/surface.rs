//! Display-surface callbacks driving the camera preview.

use super::{CaptureCoordinator, OpenOutcome};
use crate::capture::{DeviceProvider, SurfaceInfo};

/// Maps surface create/change/destroy events onto the coordinator.
pub struct SurfaceLifecycle<P: DeviceProvider> {
    coordinator: CaptureCoordinator<P>,
}

impl<P: DeviceProvider> SurfaceLifecycle<P> {
    /// Routes surface events to `coordinator`.
    pub fn new(coordinator: CaptureCoordinator<P>) -> Self {
        Self { coordinator }
    }

    /// The surface exists: open the camera onto it.
    pub fn surface_created(&self, surface: SurfaceInfo) -> OpenOutcome {
        self.coordinator.attach_surface(surface);
        self.coordinator.open_device()
    }

    /// The surface changed size. `None` means it is not backed by a
    /// drawable surface yet, in which case nothing happens.
    pub fn surface_changed(&self, surface: Option<SurfaceInfo>) {
        if let Some(surface) = surface {
            self.coordinator.resize_preview(surface);
        }
    }

    /// The surface is gone: stop the preview and release the camera.
    pub fn surface_destroyed(&self) {
        self.coordinator.close_device();
        self.coordinator.detach_surface();
    }

    /// The coordinator receiving the events.
    pub fn coordinator(&self) -> &CaptureCoordinator<P> {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, MockProvider};
    use crate::consumer::SampleConsumer;
    use crate::coordinator::CaptureState;
    use crate::conversion::Sample;

    fn lifecycle(provider: MockProvider) -> (SurfaceLifecycle<MockProvider>, SampleConsumer) {
        let consumer = SampleConsumer::spawn(|_s: Sample| {}).unwrap();
        let config = CaptureConfig::with_dimensions(4, 4);
        let coordinator = CaptureCoordinator::new(provider, config, consumer.sender());
        (SurfaceLifecycle::new(coordinator), consumer)
    }

    #[test]
    fn test_full_surface_cycle() {
        let (surface, _consumer) = lifecycle(MockProvider::new());

        let outcome = surface.surface_created(SurfaceInfo::new(4, 4));
        assert_eq!(outcome, OpenOutcome::Opened);
        assert_eq!(surface.coordinator().state(), CaptureState::Disarmed);

        surface.coordinator().arm();
        surface.surface_changed(None);
        surface.surface_changed(Some(SurfaceInfo::new(8, 8)));
        assert_eq!(surface.coordinator().state(), CaptureState::Armed);

        surface.surface_destroyed();
        assert_eq!(surface.coordinator().state(), CaptureState::Closed);

        // Destroy without a live device is harmless.
        surface.surface_destroyed();
    }

    #[test]
    fn test_recreate_after_destroy() {
        let provider = MockProvider::new();
        let (surface, _consumer) = lifecycle(provider.clone());

        surface.surface_created(SurfaceInfo::new(4, 4));
        surface.surface_destroyed();
        let outcome = surface.surface_created(SurfaceInfo::new(4, 4));

        assert_eq!(outcome, OpenOutcome::Opened);
        assert_eq!(provider.acquisitions(), 2);
        surface.surface_destroyed();
    }
}
