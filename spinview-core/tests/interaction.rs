use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use spinview_core::inertia::{coast_distance, frames_to_rest};
use spinview_core::{
    FrameQueue, FrameRequest, FrameScheduler, InteractionState, Material, Mesh, Node,
    PointerEvent, PointerPosition, Stage, TouchPhase, ViewerConfig, Viewport,
};

fn p(x: f32, y: f32) -> PointerPosition {
    PointerPosition::new(x, y)
}

fn loaded_stage() -> Stage {
    let mut stage = Stage::new(Viewport::new(400, 400), ViewerConfig::default());
    stage
        .attach_model(Node::with_surface("cube", Mesh::cube(2.0), Material::default()))
        .unwrap();
    stage
}

/// Drive the coast to rest, returning the number of frames it ran
fn coast_to_rest(stage: &mut Stage, queue: &mut FrameQueue) -> usize {
    let mut frames = 0;
    while !queue.is_empty() {
        stage.run_frame(queue);
        frames += 1;
        assert!(frames < 100_000, "coast never settled");
    }
    frames
}

#[test]
fn test_horizontal_drag_then_coast() {
    let mut stage = loaded_stage();
    let mut queue = FrameQueue::new();

    assert!(stage.pointer_down(p(100.0, 100.0)));
    stage.pointer_move(p(150.0, 100.0));
    let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.25);
    assert_relative_eq!(stage.orientation(), yaw, epsilon = 1e-6);

    queue.request_frame(stage.pointer_up().expect("release with velocity coasts"));
    assert_eq!(stage.state(), InteractionState::Coasting);

    let frames = coast_to_rest(&mut stage, &mut queue);
    let expected_frames = frames_to_rest(0.25, 0.99, 1e-4);
    assert_eq!(frames as u32, expected_frames);

    let total = 0.25 + coast_distance(0.25, 0.99, expected_frames);
    let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), total);
    assert_relative_eq!(stage.orientation(), expected, epsilon = 2e-3);
    assert_eq!(stage.state(), InteractionState::Idle);
}

#[test]
fn test_replay_is_deterministic() {
    let script = [
        PointerEvent::Down(p(200.0, 200.0)),
        PointerEvent::Move(p(210.0, 195.0)),
        PointerEvent::Move(p(232.0, 181.0)),
        PointerEvent::Move(p(240.0, 170.0)),
        PointerEvent::Up,
    ];

    let run = || {
        let mut stage = loaded_stage();
        let mut queue = FrameQueue::new();
        for event in script {
            if let Some(task) = stage.handle_pointer(event) {
                queue.request_frame(task);
            }
        }
        coast_to_rest(&mut stage, &mut queue);
        stage.orientation()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_touch_matches_mouse() {
    let path = [p(180.0, 210.0), p(195.0, 220.0), p(215.0, 236.0)];

    let mut mouse = loaded_stage();
    let mut mouse_queue = FrameQueue::new();
    mouse.handle_pointer(PointerEvent::Down(path[0]));
    for position in &path[1..] {
        mouse.handle_pointer(PointerEvent::Move(*position));
    }
    if let Some(task) = mouse.handle_pointer(PointerEvent::Up) {
        mouse_queue.request_frame(task);
    }
    coast_to_rest(&mut mouse, &mut mouse_queue);

    let mut touch = loaded_stage();
    let mut touch_queue = FrameQueue::new();
    // A second finger rides along; only the first contact counts
    touch.handle_touch(TouchPhase::Start, &[path[0], p(10.0, 10.0)]);
    for position in &path[1..] {
        touch.handle_touch(TouchPhase::Move, &[*position, p(12.0, 14.0)]);
    }
    if let Some(task) = touch.handle_touch(TouchPhase::End, &[]) {
        touch_queue.request_frame(task);
    }
    coast_to_rest(&mut touch, &mut touch_queue);

    assert_eq!(mouse.orientation(), touch.orientation());
}

#[test]
fn test_input_before_model_loads() {
    let mut stage = Stage::new(Viewport::new(400, 400), ViewerConfig::default());
    assert!(!stage.pointer_down(p(200.0, 200.0)));
    stage.pointer_move(p(260.0, 200.0));
    assert!(stage.pointer_up().is_none());
    assert_eq!(stage.state(), InteractionState::Idle);

    stage
        .attach_model(Node::with_surface("cube", Mesh::cube(2.0), Material::default()))
        .unwrap();
    assert_eq!(stage.orientation(), UnitQuaternion::identity());
    assert!(stage.pointer_down(p(200.0, 200.0)));
}

#[test]
fn test_press_off_model_ignores_moves() {
    let mut stage = loaded_stage();
    assert!(!stage.pointer_down(p(5.0, 395.0)));
    stage.pointer_move(p(200.0, 200.0));
    stage.pointer_move(p(300.0, 250.0));
    assert!(stage.pointer_up().is_none());
    assert_eq!(stage.orientation(), UnitQuaternion::identity());
}

#[test]
fn test_grab_during_coast() {
    let mut stage = loaded_stage();
    stage.pointer_down(p(200.0, 200.0));
    stage.pointer_move(p(240.0, 200.0));
    let task = stage.pointer_up().unwrap();

    for _ in 0..10 {
        assert_eq!(stage.coast_frame(task), FrameRequest::Continue);
    }
    let before_grab = stage.orientation();

    assert!(stage.pointer_down(p(200.0, 200.0)));
    assert_eq!(stage.state(), InteractionState::Dragging);
    assert_eq!(stage.coast_frame(task), FrameRequest::Stop);
    assert_eq!(stage.orientation(), before_grab);
}

#[test]
fn test_config_from_toml_drives_sensitivity() {
    let config = ViewerConfig::from_toml_str(
        r#"
        [interaction]
        sensitivity = 0.01
        "#,
    )
    .unwrap();
    let mut stage = Stage::new(Viewport::new(400, 400), config);
    stage
        .attach_model(Node::with_surface("cube", Mesh::cube(2.0), Material::default()))
        .unwrap();

    stage.pointer_down(p(200.0, 200.0));
    stage.pointer_move(p(200.0, 210.0));
    let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.1);
    assert_relative_eq!(stage.orientation(), pitch, epsilon = 1e-6);
}
