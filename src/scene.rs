//! Demo scene: a cube grid and spinning pyramids under a fly camera.
//!
//! Controls: WASD move, Q/E fly, arrows steer, C/X spawn and remove cubes,
//! Tab toggles directional/point lighting, P toggles debug markers, R
//! resets the scene.

use std::rc::Rc;

use macroquad::input::{is_key_down, is_key_pressed, KeyCode};

use crate::assets;
use crate::rasterizer::{
    linear_falloff_100, Angle, Camera, Fixed, InstanceHandle, InstancePool, Lighting, Mat4, Model,
    ShadingMode, Vec3, HEIGHT, WIDTH,
};

const CUBE_SIDE: i32 = 8;
const GRID_SPACING: i32 = 12;
const FLY_SPEED: f32 = 16.0;
const TURN_SPEED: f32 = 0.25; // turns per second

pub struct DemoScene {
    pub camera: Camera,
    cube_pool: InstancePool,
    prop_pool: InstancePool,
    cube_model: Rc<Model>,
    prop_model: Rc<Model>,
    bobbing: Option<InstanceHandle>,
    /// Cubes spawned at runtime, released LIFO.
    extra_cubes: Vec<InstanceHandle>,
    light_dir: Vec3,
    point_light: bool,
    show_markers: bool,
    heading_angle: Angle,
    elapsed: f32,
}

impl DemoScene {
    pub fn new() -> DemoScene {
        let cube_model = assets::cube_model(Fixed::from_int(CUBE_SIDE));
        let prop_model = assets::load_model("assets/models/pyramid.ron").unwrap_or_else(|err| {
            eprintln!("Failed to load pyramid asset ({}), using builtin", err);
            assets::pyramid_model(Fixed::from_int(4))
        });

        let camera = Camera::new(
            Vec3::from_ints(0, 6, 30),
            Vec3::from_ints(0, 6, 29),
            43f32.to_radians(),
            Fixed::ONE,
            Fixed::from_int(64),
            WIDTH as i32,
            HEIGHT as i32,
        );

        let mut scene = DemoScene {
            camera,
            cube_pool: InstancePool::new(16),
            prop_pool: InstancePool::new(2),
            cube_model,
            prop_model,
            bobbing: None,
            extra_cubes: Vec::new(),
            light_dir: Vec3::from_ints(3, -4, -3).unit(),
            point_light: false,
            show_markers: false,
            heading_angle: Angle::ZERO,
            elapsed: 0.0,
        };
        scene.populate();
        scene
    }

    /// Fill both pools with the demo layout.
    fn populate(&mut self) {
        self.extra_cubes.clear();
        for i in 0..9 {
            let x = (i % 3 - 1) * GRID_SPACING;
            let z = (i / 3 - 1) * GRID_SPACING;
            self.cube_pool
                .acquire(
                    Rc::clone(&self.cube_model),
                    Vec3::from_ints(x, 0, z),
                    Fixed::ONE,
                    Angle::ZERO,
                    Angle::ZERO,
                    Angle::ZERO,
                    ShadingMode::FlatLit,
                )
                .expect("cube pool sized for the grid");
        }

        self.bobbing = Some(
            self.prop_pool
                .acquire(
                    Rc::clone(&self.prop_model),
                    Vec3::from_ints(0, 10, 0),
                    Fixed::ONE,
                    Angle::ZERO,
                    Angle::ZERO,
                    Angle::ZERO,
                    ShadingMode::FlatLit,
                )
                .expect("prop pool sized for the props"),
        );
        self.prop_pool
            .acquire(
                Rc::clone(&self.prop_model),
                Vec3::from_ints(14, 8, -14),
                Fixed::ONE,
                Angle::ZERO,
                Angle::ZERO,
                Angle::ZERO,
                ShadingMode::Wireframe,
            )
            .expect("prop pool sized for the props");
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;

        // Animate the center pyramid: bob on a sine, spin slowly.
        let bob = Angle::from_turns_f32(self.elapsed * 0.4).sin() * Fixed::from_int(2);
        if let Some(prop) = self.bobbing.and_then(|h| self.prop_pool.get_mut(h)) {
            prop.pos.y = Fixed::from_int(10) + bob;
            prop.yaw += Angle::from_turns_f32(dt * 0.1);
        }

        // Steering: the heading comes from rotating the forward vector by
        // the accumulated yaw, exactly like instance rotation does.
        if is_key_down(KeyCode::Left) {
            self.heading_angle += Angle::from_turns_f32(dt * TURN_SPEED);
        }
        if is_key_down(KeyCode::Right) {
            self.heading_angle -= Angle::from_turns_f32(dt * TURN_SPEED);
        }
        let heading = Mat4::rot_y(self.heading_angle).transform(Vec3::from_ints(0, 0, -1));
        let right = heading.cross(Vec3::UP);

        let step = Fixed::from_f32(dt * FLY_SPEED);
        if is_key_down(KeyCode::W) {
            self.camera.pos = self.camera.pos + heading.scaled(step);
        }
        if is_key_down(KeyCode::S) {
            self.camera.pos = self.camera.pos - heading.scaled(step);
        }
        if is_key_down(KeyCode::A) {
            self.camera.pos = self.camera.pos - right.scaled(step);
        }
        if is_key_down(KeyCode::D) {
            self.camera.pos = self.camera.pos + right.scaled(step);
        }
        if is_key_down(KeyCode::Q) {
            self.camera.pos.y = self.camera.pos.y + step;
        }
        if is_key_down(KeyCode::E) {
            self.camera.pos.y = self.camera.pos.y - step;
        }
        self.camera.look_at = self.camera.pos + heading;

        // Spawn/despawn cubes at runtime; the pool hands slots back in
        // constant time and complains loudly when the budget runs out.
        if is_key_pressed(KeyCode::C) {
            let stack_y = 10 + 10 * self.extra_cubes.len() as i32;
            match self.cube_pool.acquire(
                Rc::clone(&self.cube_model),
                Vec3::from_ints(-GRID_SPACING * 2, stack_y, 0),
                Fixed::from_f32(0.5),
                Angle::from_degrees(45),
                Angle::ZERO,
                Angle::ZERO,
                ShadingMode::FlatLit,
            ) {
                Ok(handle) => self.extra_cubes.push(handle),
                Err(err) => eprintln!("Cannot spawn cube: {}", err),
            }
        }
        if is_key_pressed(KeyCode::X) {
            if let Some(handle) = self.extra_cubes.pop() {
                self.cube_pool
                    .release(handle)
                    .expect("spawned cube handle is live");
            }
        }

        if is_key_pressed(KeyCode::Tab) {
            self.point_light = !self.point_light;
        }
        if is_key_pressed(KeyCode::P) {
            self.show_markers = !self.show_markers;
        }
        if is_key_pressed(KeyCode::R) {
            self.cube_pool.reset();
            self.prop_pool.reset();
            self.populate();
        }
    }

    pub fn lighting(&self) -> Lighting {
        if self.point_light {
            // Headlight: the light rides the camera.
            Lighting::Point {
                pos: self.camera.pos,
                attenuation: Some(linear_falloff_100),
            }
        } else {
            Lighting::Directional(self.light_dir)
        }
    }

    pub fn pools(&self) -> [&InstancePool; 2] {
        [&self.cube_pool, &self.prop_pool]
    }

    /// Positions of all live instances, for the debug point overlay.
    pub fn marker_points(&self) -> Option<Vec<Vec3>> {
        if !self.show_markers {
            return None;
        }
        Some(
            self.pools()
                .iter()
                .flat_map(|pool| pool.iter_live())
                .map(|instance| instance.pos)
                .collect(),
        )
    }
}
