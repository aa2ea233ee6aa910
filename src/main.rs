//! Pocket Engine: GBA-style fixed-point software 3D renderer
//!
//! Everything 3D happens on the CPU in fixed-point arithmetic:
//! - Geometry transformed, culled and projected per frame
//! - Painter's-algorithm visibility (no z-buffer)
//! - Flat-shaded scanline rasterization into a 15-bit framebuffer
//!
//! The window, input and overlay text are the only pieces that touch the
//! host; the framebuffer is blitted up as a nearest-filtered texture.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod assets;
mod rasterizer;
mod scene;

use macroquad::prelude::*;
use rasterizer::{draw_points, Framebuffer, RenderPipeline, HEIGHT, WIDTH};
use scene::DemoScene;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Pocket Engine v{}", VERSION),
        window_width: WIDTH as i32 * 4,
        window_height: HEIGHT as i32 * 4,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut pipeline = RenderPipeline::new();
    let mut demo = DemoScene::new();

    // Staging buffers for the framebuffer-to-screen blit.
    let mut rgba: Vec<u8> = Vec::new();
    let mut blit = Image::gen_image_color(WIDTH as u16, HEIGHT as u16, BLACK);
    let texture = Texture2D::from_image(&blit);
    texture.set_filter(FilterMode::Nearest);

    println!("=== Pocket Engine ===");
    println!("WASD move, Q/E fly, arrows steer, C/X cubes, Tab light, P markers, R reset, F12 screenshot");

    loop {
        // Update phase: scene logic mutates instances and the camera pose.
        demo.update(get_frame_time());

        // Draw phase: camera matrices first, then the three pipeline stages.
        demo.camera.update_for_frame();
        fb.clear(rasterizer::Color::BLACK);
        let stats = pipeline
            .render_frame(&mut fb, &demo.camera, &demo.pools(), &demo.lighting())
            .expect("render frame");
        if let Some(points) = demo.marker_points() {
            draw_points(&mut fb, &demo.camera, &points, rasterizer::Color::RED);
        }

        // Blit, integer-ish scaled and centered.
        fb.to_rgba8(&mut rgba);
        blit.bytes.copy_from_slice(&rgba);
        texture.update(&blit);

        clear_background(Color::from_rgba(20, 20, 24, 255));
        let scale = (screen_width() / WIDTH as f32).min(screen_height() / HEIGHT as f32);
        let dest_w = WIDTH as f32 * scale;
        let dest_h = HEIGHT as f32 * scale;
        draw_texture_ex(
            &texture,
            (screen_width() - dest_w) * 0.5,
            (screen_height() - dest_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest_w, dest_h)),
                ..Default::default()
            },
        );

        draw_text(&format!("tris: {}", stats.triangles), 10.0, 24.0, 24.0, WHITE);
        draw_text(&format!("fps: {}", get_fps()), 10.0, 48.0, 24.0, WHITE);

        if is_key_pressed(KeyCode::F12) {
            save_screenshot(&rgba);
        }

        next_frame().await;
    }
}

/// Dump the current framebuffer as a PNG next to the executable.
fn save_screenshot(rgba: &[u8]) {
    let Some(img) = image::RgbaImage::from_raw(WIDTH as u32, HEIGHT as u32, rgba.to_vec()) else {
        eprintln!("Screenshot failed: framebuffer size mismatch");
        return;
    };
    match img.save("screenshot.png") {
        Ok(()) => println!("Saved screenshot.png"),
        Err(e) => eprintln!("Screenshot failed: {}", e),
    }
}
