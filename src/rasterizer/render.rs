//! Core rendering functions
//! Geometry/projection stage, painter's depth sort, and the DDA scanline
//! rasterizer, all writing into a packed 15-bit framebuffer.

use std::fmt;

use super::camera::Camera;
use super::fixed::Fixed;
use super::math::{Mat4, Vec3};
use super::pool::{InstancePool, ModelInstance};
use super::types::{Color, FaceKind, Lighting, RasterPoint, RasterTriangle, ShadingMode};
use super::MAX_FRAME_TRIANGLES;

/// Floor for the grey shade of lit faces; keeps everything visible.
const MIN_SHADE: i32 = 2;

/// Framebuffer of packed 15-bit RGB pixels.
pub struct Framebuffer {
    pixels: Vec<u16>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.bits());
    }

    /// Pixel at (x, y); out-of-bounds reads come back black.
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let bits = self.pixels[y * self.width + x];
            Color::rgb15(bits & 31, (bits >> 5) & 31, (bits >> 10) & 31)
        } else {
            Color::BLACK
        }
    }

    /// Bounds-checked single-pixel write.
    pub fn plot(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color.bits();
        }
    }

    /// Horizontal run [x0, x1] inclusive, clipped to the canvas; draws
    /// nothing when x1 < x0.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        if x1 < x0 || y < 0 || y as usize >= self.height {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        if x1 < x0 {
            return;
        }
        let row = y as usize * self.width;
        self.pixels[row + x0 as usize..=row + x1 as usize].fill(color.bits());
    }

    /// Expand the whole framebuffer to RGBA8, row-major.
    pub fn to_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for &bits in &self.pixels {
            out.extend_from_slice(&Color::rgb15(bits & 31, (bits >> 5) & 31, (bits >> 10) & 31).to_rgba8());
        }
    }
}

/// Fatal pipeline errors: programming mistakes or mis-sized scene budgets.
/// A frame either completes all stages or the caller halts on one of these.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderError {
    /// More visible triangles this frame than the scratch buffer can hold.
    TriangleBudgetExceeded,
    /// Framebuffer dimensions don't match the camera's canvas.
    CanvasMismatch {
        canvas: (i32, i32),
        framebuffer: (usize, usize),
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TriangleBudgetExceeded => {
                write!(f, "frame exceeds {} visible triangles", MAX_FRAME_TRIANGLES)
            }
            RenderError::CanvasMismatch { canvas, framebuffer } => write!(
                f,
                "camera canvas {}x{} does not match framebuffer {}x{}",
                canvas.0, canvas.1, framebuffer.0, framebuffer.1
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Per-frame counters handed back to the caller (overlay/instrumentation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles that survived culling and were rasterized.
    pub triangles: usize,
}

/// The render pipeline and its per-frame scratch state: a bounded
/// screen-triangle buffer and a reusable camera-space vertex buffer. Both
/// are overwritten every frame and never outlive one `render_frame` call
/// logically, though their storage is reused.
pub struct RenderPipeline {
    triangles: Vec<RasterTriangle>,
    verts_cam_space: Vec<Vec3>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            triangles: Vec::with_capacity(MAX_FRAME_TRIANGLES),
            verts_cam_space: Vec::new(),
        }
    }

    /// Draw one frame: geometry/projection over every live instance of
    /// every pool, back-to-front depth sort, scanline fill. The camera must
    /// have been updated for this frame already.
    pub fn render_frame(
        &mut self,
        fb: &mut Framebuffer,
        camera: &Camera,
        pools: &[&InstancePool],
        lighting: &Lighting,
    ) -> Result<FrameStats, RenderError> {
        if camera.canvas_width as usize != fb.width || camera.canvas_height as usize != fb.height {
            return Err(RenderError::CanvasMismatch {
                canvas: (camera.canvas_width, camera.canvas_height),
                framebuffer: (fb.width, fb.height),
            });
        }

        self.triangles.clear();
        for pool in pools {
            for instance in pool.iter_live() {
                self.process_instance(camera, instance, lighting)?;
            }
        }

        // No z-buffer: order back-to-front (most negative camera-space z
        // first) and let nearer triangles overpaint farther ones. The sort
        // is deliberately unstable; equal depths tie-break arbitrarily.
        self.triangles.sort_unstable_by_key(|tri| tri.depth);

        self.fill_triangles(fb);
        Ok(FrameStats {
            triangles: self.triangles.len(),
        })
    }

    /// Transform one instance into camera space and emit its visible faces.
    fn process_instance(
        &mut self,
        camera: &Camera,
        instance: &ModelInstance,
        lighting: &Lighting,
    ) -> Result<(), RenderError> {
        let rotation = Mat4::yaw_pitch_roll(instance.yaw, instance.pitch, instance.roll);

        // Model space to camera space. Translation happens outside the
        // matrix so `rotation` stays pure and can rotate face normals for
        // lighting later.
        self.verts_cam_space.clear();
        for &vert in instance.model.verts() {
            let world = rotation.transform(vert.scaled(instance.scale)) + instance.pos;
            self.verts_cam_space.push(camera.world_to_cam().transform(world));
        }

        let near_z = -camera.near;
        let far_z = -camera.far;

        for face in instance.model.faces() {
            let FaceKind::Triangle = face.kind; // only triangles exist today
            let v0 = self.verts_cam_space[face.indices[0]];
            let v1 = self.verts_cam_space[face.indices[1]];
            let v2 = self.verts_cam_space[face.indices[2]];

            // Backface culling (clockwise winding). The vertices are in
            // camera space already, so v0 doubles as the camera-to-face
            // vector.
            let normal = (v1 - v0).cross(v2 - v0);
            if normal.dot(v0) <= Fixed::ZERO {
                continue;
            }

            // Whole-triangle rejection against the near plane; no polygon
            // clipping, so faces straddling it pop out. Same wholesale
            // policy against the far plane.
            if v0.z > near_z || v1.z > near_z || v2.z > near_z {
                continue;
            }
            if v0.z < far_z || v1.z < far_z || v2.z < far_z {
                continue;
            }

            // Perspective projection to integer screen coordinates.
            let mut verts = [RasterPoint::default(); 3];
            for (out, &vert) in verts.iter_mut().zip([v0, v1, v2].iter()) {
                debug_assert!(vert.z <= near_z, "perspective divide in front of near plane");
                let projected = camera.perspective().transform(vert);
                *out = RasterPoint::new(projected.x.to_int(), projected.y.to_int());
            }

            // Trivial reject: all three vertices outside one canvas edge.
            // Partially visible triangles stay; the rasterizer clamps per
            // scanline instead of clipping in 2D.
            let (w, h) = (camera.canvas_width, camera.canvas_height);
            if verts.iter().all(|v| v.x < 0)
                || verts.iter().all(|v| v.x >= w)
                || verts.iter().all(|v| v.y < 0)
                || verts.iter().all(|v| v.y >= h)
            {
                continue;
            }

            let color = shade_face(&rotation, instance, face.normal, face.indices[0], lighting);

            if self.triangles.len() >= MAX_FRAME_TRIANGLES {
                return Err(RenderError::TriangleBudgetExceeded);
            }
            self.triangles.push(RasterTriangle {
                verts,
                color,
                depth: v0.z,
                kind: instance.shading,
            });
        }
        Ok(())
    }

    /// Rasterize the sorted triangle buffer.
    fn fill_triangles(&self, fb: &mut Framebuffer) {
        for tri in &self.triangles {
            match tri.kind {
                ShadingMode::FlatLit => fill_flat_triangle(fb, tri),
                ShadingMode::Wireframe => draw_wireframe_triangle(fb, tri),
            }
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat greyscale lighting: the face normal is rotated with the instance's
/// rotation matrix and dotted against the light. The result modulates
/// brightness only; the face's own color attribute is not factored in, so
/// lit faces come out as grey levels.
fn shade_face(
    rotation: &Mat4,
    instance: &ModelInstance,
    model_normal: Vec3,
    anchor_index: usize,
    lighting: &Lighting,
) -> Color {
    let normal = rotation.transform(model_normal);
    let alpha = match *lighting {
        Lighting::Directional(dir) => dir.dot(normal),
        Lighting::Point { pos, attenuation } => {
            // Re-derive the anchor vertex's world position; the camera-space
            // copies are useless for world-space light math.
            let anchor = instance.model.verts()[anchor_index];
            let world = rotation.transform(anchor.scaled(instance.scale)) + instance.pos;
            let to_light = pos - world;
            let mut a = to_light.unit().dot(normal);
            if let Some(falloff) = attenuation {
                a = a * falloff(to_light.length());
            }
            a
        }
    };

    if alpha > Fixed::ZERO {
        let level = (alpha * Fixed::from_int(31)).to_int().max(MIN_SHADE);
        Color::grey15(level as u16)
    } else {
        Color::grey15(MIN_SHADE as u16)
    }
}

/// DDA scanline fill, flat-shaded, top-left convention so adjacent
/// triangles neither overlap nor leave seams. Off-screen spans are handled
/// by per-scanline clamping alone; there is no 2D clipping pass.
fn fill_flat_triangle(fb: &mut Framebuffer, tri: &RasterTriangle) {
    let [mut v1, mut v2, mut v3] = tri.verts;
    // Order vertices: v1 top, v2 middle, v3 bottom.
    if v1.y > v2.y {
        std::mem::swap(&mut v1, &mut v2);
    }
    if v2.y > v3.y {
        std::mem::swap(&mut v2, &mut v3);
    }
    if v1.y > v2.y {
        std::mem::swap(&mut v1, &mut v2);
    }

    if v1.y == v3.y {
        // Zero-height triangle.
        return;
    }

    let width = fb.width() as i32;
    let height = fb.height() as i32;

    // If the middle vertex sits left of the top one, the left boundary is
    // the two short edges; otherwise the right boundary is.
    let middle_left = v2.x <= v1.x;

    let invslope_long = Fixed::from_int(v3.x - v1.x) / Fixed::from_int(v3.y - v1.y);
    let invslope_short = if v2.y - v1.y != 0 {
        Fixed::from_int(v2.x - v1.x) / Fixed::from_int(v2.y - v1.y)
    } else {
        // Flat top: the v1->v2 edge is horizontal, step along v2->v3
        // instead. v3.y != v2.y here, since v1.y != v3.y.
        Fixed::from_int(v3.x - v2.x) / Fixed::from_int(v3.y - v2.y)
    };

    // Top section.
    let y_start = v1.y.max(0);
    let y_end = v2.y.min(height - 1);
    let dy = Fixed::from_int(y_start - v1.y);
    let left_delta = if middle_left { invslope_short } else { invslope_long };
    let right_delta = if middle_left { invslope_long } else { invslope_short };
    let mut x_left = Fixed::from_int(v1.x) + dy * left_delta;
    let mut x_right = Fixed::from_int(v1.x) + dy * right_delta;
    for y in y_start..y_end {
        x_left += left_delta;
        x_right += right_delta;
        let left = x_left.to_int().clamp(0, width - 1);
        let right = x_right.to_int().clamp(0, width - 1);
        fb.hline(left, right - 1, y, tri.color);
    }

    // Bottom section; absent entirely for flat-bottom triangles.
    if v2.y >= v3.y {
        return;
    }
    let invslope_short = Fixed::from_int(v3.x - v2.x) / Fixed::from_int(v3.y - v2.y);
    let left_delta = if middle_left { invslope_short } else { invslope_long };
    let right_delta = if middle_left { invslope_long } else { invslope_short };
    let y_start = v2.y.max(0);
    let y_end = v3.y.min(height - 1);
    let dy = Fixed::from_int(y_start - v2.y);
    let mut x_left = if middle_left {
        Fixed::from_int(v2.x) + dy * left_delta
    } else {
        x_left + left_delta
    };
    let mut x_right = if middle_left {
        x_right + right_delta
    } else {
        Fixed::from_int(v2.x) + dy * right_delta
    };
    for y in y_start..y_end {
        let left = x_left.to_int().clamp(0, width - 1);
        let right = x_right.to_int().clamp(0, width - 1);
        fb.hline(left, right - 1, y, tri.color);
        x_left += left_delta;
        x_right += right_delta;
    }
}

/// Wireframe drawing path. Instances tagged wireframe flow through the
/// whole pipeline but nothing is plotted for them yet.
fn draw_wireframe_triangle(_fb: &mut Framebuffer, _tri: &RasterTriangle) {
    // TODO: draw the three edges with Bresenham lines.
}

/// Project standalone world-space points and plot the visible ones.
/// Debug/overlay utility, independent of the triangle pipeline.
pub fn draw_points(fb: &mut Framebuffer, camera: &Camera, points: &[Vec3], color: Color) {
    for &point in points {
        let cam_space = camera.world_to_cam().transform(point);
        if cam_space.z > -camera.near {
            // Behind the near plane, invisible.
            continue;
        }
        let projected = camera.perspective().transform(cam_space);
        fb.plot(projected.x.to_int(), projected.y.to_int(), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::fixed::Angle;
    use crate::rasterizer::types::{Face, Model};
    use crate::rasterizer::{HEIGHT, WIDTH};
    use std::rc::Rc;

    fn test_camera() -> Camera {
        Camera::new(
            Vec3::from_ints(0, 0, 10),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_3,
            Fixed::ONE,
            Fixed::from_int(64),
            WIDTH as i32,
            HEIGHT as i32,
        )
    }

    /// One-triangle model; the (0, 2, 1) index order faces the test camera.
    fn tri_model(v0: Vec3, v1: Vec3, v2: Vec3, front_facing: bool) -> Rc<Model> {
        let indices = if front_facing { [0, 2, 1] } else { [0, 1, 2] };
        let face = Face::tri(
            indices[0],
            indices[1],
            indices[2],
            Vec3::from_ints(0, 0, 1),
            Color::WHITE,
        );
        Rc::new(Model::new(vec![v0, v1, v2], vec![face]).unwrap())
    }

    fn pool_with(model: Rc<Model>, shading: ShadingMode) -> InstancePool {
        let mut pool = InstancePool::new(4);
        pool.acquire(
            model,
            Vec3::ZERO,
            Fixed::ONE,
            Angle::ZERO,
            Angle::ZERO,
            Angle::ZERO,
            shading,
        )
        .unwrap();
        pool
    }

    fn render(pool: &InstancePool) -> (RenderPipeline, Framebuffer, FrameStats) {
        let camera = test_camera();
        let mut fb = Framebuffer::new(WIDTH, HEIGHT);
        let mut pipeline = RenderPipeline::new();
        let lighting = Lighting::Directional(Vec3::from_ints(0, 0, 1));
        let stats = pipeline
            .render_frame(&mut fb, &camera, &[pool], &lighting)
            .unwrap();
        (pipeline, fb, stats)
    }

    fn unit_tri(front_facing: bool) -> Rc<Model> {
        tri_model(
            Vec3::from_ints(0, 0, 0),
            Vec3::from_ints(3, 0, 0),
            Vec3::from_ints(0, 3, 0),
            front_facing,
        )
    }

    #[test]
    fn test_backface_culling() {
        let (_, _, stats) = render(&pool_with(unit_tri(false), ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 0);
        let (_, _, stats) = render(&pool_with(unit_tri(true), ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 1);
    }

    #[test]
    fn test_near_plane_rejection() {
        // Camera sits at z=10 with near=1: anything at world z > 9 is
        // behind the near plane in camera space.
        let near_tri = tri_model(
            Vec3::new(Fixed::ZERO, Fixed::ZERO, Fixed::from_f32(9.5)),
            Vec3::new(Fixed::from_int(3), Fixed::ZERO, Fixed::from_f32(9.5)),
            Vec3::new(Fixed::ZERO, Fixed::from_int(3), Fixed::from_f32(9.5)),
            true,
        );
        let (_, _, stats) = render(&pool_with(near_tri, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 0);
    }

    #[test]
    fn test_partially_behind_near_plane_rejected_whole() {
        let straddling = tri_model(
            Vec3::new(Fixed::ZERO, Fixed::ZERO, Fixed::from_f32(9.5)),
            Vec3::from_ints(3, 0, 0),
            Vec3::from_ints(0, 3, 0),
            true,
        );
        let (_, _, stats) = render(&pool_with(straddling, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 0);
    }

    #[test]
    fn test_far_plane_rejection() {
        // far=64, camera at z=10: world z = -60 is at camera-space -70.
        let far_tri = tri_model(
            Vec3::from_ints(0, 0, -60),
            Vec3::from_ints(3, 0, -60),
            Vec3::from_ints(0, 3, -60),
            true,
        );
        let (_, _, stats) = render(&pool_with(far_tri, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 0);

        let in_range = tri_model(
            Vec3::from_ints(0, 0, -40),
            Vec3::from_ints(3, 0, -40),
            Vec3::from_ints(0, 3, -40),
            true,
        );
        let (_, _, stats) = render(&pool_with(in_range, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 1);
    }

    #[test]
    fn test_off_canvas_trivial_reject() {
        // Far to the left of the view frustum: every projected x < 0.
        let off_left = tri_model(
            Vec3::from_ints(-100, 0, 0),
            Vec3::from_ints(-97, 0, 0),
            Vec3::from_ints(-100, 3, 0),
            true,
        );
        let (_, _, stats) = render(&pool_with(off_left, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 0);

        // Straddling the left edge must be kept.
        let straddling = tri_model(
            Vec3::from_ints(-9, 0, 0),
            Vec3::from_ints(0, 0, 0),
            Vec3::from_ints(-9, 3, 0),
            true,
        );
        let (_, _, stats) = render(&pool_with(straddling, ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 1);
    }

    #[test]
    fn test_depth_sorted_back_to_front() {
        let mut pool = InstancePool::new(8);
        for z in [0, -20, -10, -5] {
            pool.acquire(
                unit_tri(true),
                Vec3::from_ints(0, 0, z),
                Fixed::ONE,
                Angle::ZERO,
                Angle::ZERO,
                Angle::ZERO,
                ShadingMode::FlatLit,
            )
            .unwrap();
        }
        let (pipeline, _, stats) = render(&pool);
        assert_eq!(stats.triangles, 4);
        for pair in pipeline.triangles.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
    }

    #[test]
    fn test_identity_instance_matches_camera_matrices() {
        // With identity rotation, unit scale and zero translation, the
        // emitted screen coordinates must equal the camera's own matrices
        // applied vertex by vertex.
        let model = unit_tri(true);
        let camera = test_camera();
        let (pipeline, _, stats) = render(&pool_with(Rc::clone(&model), ShadingMode::FlatLit));
        assert_eq!(stats.triangles, 1);

        let face = &model.faces()[0];
        let emitted = &pipeline.triangles[0];
        for (slot, &index) in face.indices.iter().enumerate() {
            let cam_space = camera.world_to_cam().transform(model.verts()[index]);
            let projected = camera.perspective().transform(cam_space);
            assert_eq!(emitted.verts[slot].x, projected.x.to_int());
            assert_eq!(emitted.verts[slot].y, projected.y.to_int());
        }
    }

    #[test]
    fn test_wireframe_emits_triangles_but_no_pixels() {
        let (_, fb, stats) = render(&pool_with(unit_tri(true), ShadingMode::Wireframe));
        assert_eq!(stats.triangles, 1);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                assert_eq!(fb.pixel(x, y), Color::BLACK);
            }
        }
    }

    #[test]
    fn test_triangle_budget_overflow_is_fatal() {
        let mut pool = InstancePool::new(MAX_FRAME_TRIANGLES + 1);
        for _ in 0..MAX_FRAME_TRIANGLES + 1 {
            pool.acquire(
                unit_tri(true),
                Vec3::ZERO,
                Fixed::ONE,
                Angle::ZERO,
                Angle::ZERO,
                Angle::ZERO,
                ShadingMode::FlatLit,
            )
            .unwrap();
        }
        let camera = test_camera();
        let mut fb = Framebuffer::new(WIDTH, HEIGHT);
        let mut pipeline = RenderPipeline::new();
        let lighting = Lighting::Directional(Vec3::from_ints(0, 0, 1));
        assert_eq!(
            pipeline.render_frame(&mut fb, &camera, &[&pool], &lighting),
            Err(RenderError::TriangleBudgetExceeded)
        );
    }

    #[test]
    fn test_canvas_mismatch_is_fatal() {
        let camera = test_camera();
        let mut fb = Framebuffer::new(WIDTH / 2, HEIGHT);
        let mut pipeline = RenderPipeline::new();
        let pool = InstancePool::new(1);
        let lighting = Lighting::Directional(Vec3::from_ints(0, 0, 1));
        assert!(matches!(
            pipeline.render_frame(&mut fb, &camera, &[&pool], &lighting),
            Err(RenderError::CanvasMismatch { .. })
        ));
    }

    fn row_run(fb: &Framebuffer, y: usize) -> Option<(usize, usize)> {
        let mut first = None;
        let mut last = None;
        for x in 0..fb.width() {
            if fb.pixel(x, y) != Color::BLACK {
                if first.is_none() {
                    first = Some(x);
                }
                last = Some(x);
            }
        }
        first.map(|f| (f, last.unwrap()))
    }

    fn fill_one(fb: &mut Framebuffer, verts: [RasterPoint; 3]) {
        let tri = RasterTriangle {
            verts,
            color: Color::WHITE,
            depth: Fixed::ZERO,
            kind: ShadingMode::FlatLit,
        };
        fill_flat_triangle(fb, &tri);
    }

    #[test]
    fn test_fill_flat_top_triangle_coverage() {
        let mut fb = Framebuffer::new(16, 16);
        fill_one(
            &mut fb,
            [
                RasterPoint::new(0, 0),
                RasterPoint::new(10, 0),
                RasterPoint::new(5, 10),
            ],
        );

        // Widest at the flat edge, tapering toward the apex, each row one
        // contiguous run.
        let (first, last) = row_run(&fb, 0).unwrap();
        assert_eq!((first, last), (0, 9));

        let mut prev_width = usize::MAX;
        for y in 0..16 {
            match row_run(&fb, y) {
                Some((f, l)) => {
                    let width = l - f + 1;
                    assert!(width <= prev_width);
                    prev_width = width;
                    for x in f..=l {
                        assert_ne!(fb.pixel(x, y), Color::BLACK);
                    }
                }
                None => assert!(y >= 9, "unexpected empty row {} inside the triangle", y),
            }
        }
        // Nothing at or below the apex row.
        assert!(row_run(&fb, 10).is_none());
    }

    #[test]
    fn test_fill_flat_bottom_triangle_skips_bottom_half() {
        let mut fb = Framebuffer::new(16, 16);
        fill_one(
            &mut fb,
            [
                RasterPoint::new(5, 0),
                RasterPoint::new(0, 10),
                RasterPoint::new(10, 10),
            ],
        );
        // Apex row is near-empty, widening downward; the flat-bottom edge
        // itself is excluded by the half-open scan.
        assert!(row_run(&fb, 2).is_some());
        assert!(row_run(&fb, 9).is_some());
        assert!(row_run(&fb, 10).is_none());
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        fill_one(
            &mut fb,
            [
                RasterPoint::new(0, 5),
                RasterPoint::new(3, 5),
                RasterPoint::new(7, 5),
            ],
        );
        for y in 0..16 {
            assert!(row_run(&fb, y).is_none());
        }
    }

    #[test]
    fn test_offscreen_spans_clamped() {
        // Straddles the left edge; must not panic and must only write
        // inside the canvas.
        let mut fb = Framebuffer::new(16, 16);
        fill_one(
            &mut fb,
            [
                RasterPoint::new(-10, 0),
                RasterPoint::new(8, 0),
                RasterPoint::new(-10, 12),
            ],
        );
        assert!(row_run(&fb, 1).is_some());
    }

    #[test]
    fn test_draw_points() {
        let camera = test_camera();
        let mut fb = Framebuffer::new(WIDTH, HEIGHT);
        let points = [
            Vec3::ZERO,                    // ahead of the camera
            Vec3::from_ints(0, 0, 20),     // behind it
            Vec3::from_ints(-500, 0, 0),   // projects off-canvas
        ];
        draw_points(&mut fb, &camera, &points, Color::RED);
        let lit: usize = (0..HEIGHT)
            .map(|y| (0..WIDTH).filter(|&x| fb.pixel(x, y) != Color::BLACK).count())
            .sum();
        assert_eq!(lit, 1);
        assert_eq!(fb.pixel(WIDTH / 2, HEIGHT / 2), Color::RED);
    }

    #[test]
    fn test_shading_is_greyscale_and_floored() {
        // Light pointing straight at the face's rotated normal.
        let (pipeline, _, _) = render(&pool_with(unit_tri(true), ShadingMode::FlatLit));
        let color = pipeline.triangles[0].color;
        assert_eq!(color.r(), color.g());
        assert_eq!(color.g(), color.b());
        assert!(color.r() >= MIN_SHADE as u16);
    }
}
