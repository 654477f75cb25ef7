use std::f32::consts::FRAC_PI_2;

use instanced_mobile::{
    AppConfig, BufferTarget, CUBE_INDEX_COUNT, CameraMode, ConfigError, ConstantsBuffer,
    DrawIndexed, FrameConstants, FramePlan, FrameState, HostBuffer, InitError, InstanceBuffer,
    InstanceLayout, InstanceRaw, MAX_GRID_SIZE_LIMIT, MOBILE_INSTANCE_COUNT, Mat4, Vec3, run,
};

fn top_view_at_rest() -> FrameState {
    FrameState {
        angle: 0.0,
        camera_mode: CameraMode::Top,
        ..FrameState::default()
    }
}

#[test]
fn top_camera_at_rest() {
    let plan = FramePlan::build(&top_view_at_rest(), 1.0);

    let expected =
        Mat4::from_translation(Vec3::new(0.0, 0.0, 40.0)) * Mat4::from_rotation_x(-FRAC_PI_2);
    assert!(plan.view.abs_diff_eq(expected, 1e-6));
    assert_eq!(
        plan.draw,
        DrawIndexed {
            index_count: 36,
            instance_count: MOBILE_INSTANCE_COUNT as u32,
        }
    );
    assert_eq!(CUBE_INDEX_COUNT, 36);
}

#[test]
fn frame_uploads_match_plan() {
    let plan = FramePlan::build(&top_view_at_rest(), 16.0 / 9.0);

    let capacity = 27;
    let mut instances =
        InstanceBuffer::with_target(HostBuffer::new(capacity * InstanceRaw::SIZE)).unwrap();
    instances.upload(&plan.instances).unwrap();

    let uploaded = bytemuck::cast_slice::<InstanceRaw, u8>(&plan.instances);
    let contents = instances.target().contents();
    assert_eq!(&contents[..uploaded.len()], uploaded);
    assert!(contents[uploaded.len()..].iter().all(|&b| b == 0));
    assert_eq!(instances.len(), MOBILE_INSTANCE_COUNT);

    let mut constants = ConstantsBuffer::with_target(HostBuffer::new(FrameConstants::SIZE));
    *constants.map_write() = plan.constants;
    let written: FrameConstants = bytemuck::pod_read_unaligned(constants.target().contents());
    assert_eq!(written, plan.constants);
}

#[test]
fn animation_turns_the_mobile() {
    let mut state = top_view_at_rest();
    let first = FramePlan::build(&state, 1.0);
    state.advance(1.0 / 60.0);
    let second = FramePlan::build(&state, 1.0);

    assert!((state.angle - 0.01).abs() < 1e-6);
    assert_eq!(first.instances.len(), second.instances.len());
    // The center bob sits on the axis of rotation; the outer bobs swing around it.
    assert_eq!(first.instances[0].model[3], second.instances[0].model[3]);
    assert_ne!(first.instances[1].model[3], second.instances[1].model[3]);
    // View and projection do not depend on the angle.
    assert_eq!(first.constants, second.constants);
}

#[test]
fn grid_layout_fills_capacity() {
    let state = FrameState {
        layout: InstanceLayout::Grid,
        grid_size: 4,
        ..FrameState::default()
    };
    let plan = FramePlan::build(&state, 1.0);
    assert_eq!(plan.draw.instance_count, 64);

    let mut instances =
        InstanceBuffer::with_target(HostBuffer::new(64 * InstanceRaw::SIZE)).unwrap();
    instances.upload(&plan.instances).unwrap();
    assert_eq!(instances.target().size(), 64 * InstanceRaw::SIZE);
    assert_eq!(instances.target().write_count(), 1);
}

#[test]
fn run_rejects_oversized_builder_config() {
    // Validation happens before the event loop or any GPU work starts.
    for max_grid_size in [MAX_GRID_SIZE_LIMIT + 1, 200, u32::MAX] {
        let result = run(AppConfig::new().max_grid_size(max_grid_size));
        assert!(
            matches!(result, Err(InitError::Config(ConfigError::Invalid(_)))),
            "max_grid_size {max_grid_size}"
        );
    }
}
