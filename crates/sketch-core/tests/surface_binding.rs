//! Integration tests: binding surfaces to targets through the registry.

use sketch_core::*;

fn registry() -> SurfaceRegistry<RecordingContext> {
    SurfaceRegistry::new(AnimationClock::new(ManualFrameHost::new()))
}

fn target(width: u32, height: u32) -> Result<BindTarget<RecordingContext>, BindError> {
    Ok(BindTarget {
        context: RecordingContext::new(),
        width,
        height,
    })
}

#[test]
fn binding_twice_yields_same_surface() {
    let mut reg = registry();
    let id = SurfaceId::intern("stage");
    let first = reg.bind(id, SurfaceOptions::default(), || target(320, 240)).unwrap();
    let second = reg.bind(id, SurfaceOptions::default(), || target(1, 1)).unwrap();

    assert!(first.ptr_eq(&second));
    assert_eq!((second.width(), second.height()), (320, 240));
}

#[test]
fn bound_surface_starts_stopped_with_native_size() {
    let mut reg = registry();
    let surface = reg
        .bind(SurfaceId::generate(), SurfaceOptions::default(), || target(800, 600))
        .unwrap();
    assert_eq!(surface.width(), 800);
    assert_eq!(surface.height(), 600);
    assert!(!surface.is_running());
}

#[test]
fn rebind_ignores_new_options() {
    let mut reg = registry();
    let id = SurfaceId::intern("options-once");
    let original = SurfaceOptions {
        alpha: 0.3,
        ..SurfaceOptions::default()
    };
    reg.bind(id, original.clone(), || target(10, 10)).unwrap();
    let again = reg
        .bind(
            id,
            SurfaceOptions {
                alpha: 0.9,
                ..SurfaceOptions::default()
            },
            || target(10, 10),
        )
        .unwrap();
    assert_eq!(again.options(), original);
}

#[test]
fn invalid_target_is_a_bind_error() {
    let mut reg = registry();
    let err = reg
        .bind(SurfaceId::intern("div"), SurfaceOptions::default(), || {
            Err(BindError::NotACanvas)
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "requires a canvas element");
    assert!(reg.is_empty());
}

#[test]
fn malformed_options_json_maps_to_bind_error() {
    let err: BindError = SurfaceOptions::from_json("{").unwrap_err().into();
    assert!(matches!(err, BindError::InvalidOptions(_)));
}
