//! Rendering: scene pass (skybox and ship) then the screen overlay.

pub(crate) mod overlay;

use anyhow::Result;
use renderer::SceneDraw;

use crate::DemoState;

/// Draw one frame. Called from `DemoState::render()`.
pub fn run(state: &mut DemoState) -> Result<()> {
    let Some((output, mut encoder)) = state.renderer.begin_frame()? else {
        return Ok(());
    };
    let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

    let lights = state.world.scene.spot_lights();
    state.renderer.update_frame(&state.world.camera, &lights, state.world.ambient);

    // Nodes whose model has not arrived yet draw nothing.
    let renderables = state.world.scene.renderables();
    let draws: Vec<SceneDraw> = renderables
        .iter()
        .filter_map(|r| {
            state.models.get(r.renderable.model.0 as usize).map(|model| SceneDraw {
                model,
                world: r.world,
                unlit: r.renderable.unlit,
            })
        })
        .collect();
    state.renderer.render_scene(&mut encoder, &view, &draws);

    let (sw, sh) = state.renderer.dimensions();
    let tb = overlay::build(&state.overlay_view(), &state.layout, sw as f32, sh as f32);
    state.renderer.render_overlay(&mut encoder, &view, &tb.vertices, &tb.indices);

    state.renderer.end_frame(output, encoder);
    Ok(())
}
