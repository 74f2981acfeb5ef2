//! Headless end-to-end drive of the manipulation engine.
//!
//! Builds a small scene, selects a node, picks the X axis with a synthetic
//! pointer ray, drags it two units, commits, and undoes, printing poses
//! along the way. Run with `RUST_LOG=debug` to watch the engine's own
//! diagnostics.

use anyhow::Result;
use claymore::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = BasicSceneGraph::new();
    let crate_node = scene.add_node(None);
    let lid = scene.add_node(Some(crate_node));
    scene.set_pose(lid, Pose::at(Vector3::new(0.0, 1.0, 0.0)));

    let mut gizmo = TransformGizmo::new(GizmoConfig::default());
    gizmo.add_target(&mut scene, crate_node, true)?;
    println!(
        "selected node {crate_node}, highlighted set: {:?}",
        gizmo.highlighted()
    );

    // Camera on the +Z axis looking at the origin; the host would normally
    // derive rays from the mouse position. Aim at a point on the X handle.
    let view = Viewpoint::looking_at(
        Vector3::new(0.0, 0.0, 10.0),
        Vector3::zero(),
        Vector3::unit_y(),
    );
    let eye = view.position;
    let grab = Ray::new(eye, Vector3::new(1.0, 0.0, 0.0) - eye);

    gizmo.update(&scene, view, &grab);
    println!("near axis under pointer: {:?}", gizmo.near_axis());

    assert!(gizmo.begin_drag(&scene, &grab));
    for step in 1..=4 {
        let target = Vector3::new(1.0 + step as f32 * 0.5, 0.0, 0.0);
        let ray = Ray::new(eye, target - eye);
        gizmo.update(&scene, view, &ray);
        gizmo.step_drag(&mut scene, &DragInput::new(ray));
        println!(
            "step {step}: node at {:?}, pivot at {:?}",
            scene.pose(crate_node).position,
            gizmo.pivot_point()
        );
    }
    gizmo.end_drag(&mut scene);

    println!(
        "drag committed; history depth = {}, node at {:?}",
        gizmo.undo_depth(),
        scene.pose(crate_node).position
    );

    gizmo.undo(&mut scene);
    println!("after undo: node back at {:?}", scene.pose(crate_node).position);
    gizmo.redo(&mut scene);
    println!("after redo: node at {:?}", scene.pose(crate_node).position);

    Ok(())
}
