//! Camera state and its derived transforms

use super::fixed::Fixed;
use super::math::{Mat4, Vec3};

/// Camera pose plus the two matrices derived from it: the world-to-camera
/// view transform (rebuilt once per frame) and the perspective projection
/// (fixed at creation time).
///
/// Camera space looks down -z; a point is visible between `z = -near` and
/// `z = -far`.
pub struct Camera {
    pub pos: Vec3,
    pub look_at: Vec3,
    /// Near clip distance in camera-space units (positive).
    pub near: Fixed,
    /// Far clip distance in camera-space units (positive).
    pub far: Fixed,
    pub canvas_width: i32,
    pub canvas_height: i32,
    world2cam: Mat4,
    persp: Mat4,
}

impl Camera {
    /// Build a camera. `fov_radians` is the vertical field of view; the
    /// float trigonometry here runs once at creation, outside the per-frame
    /// hot path. The perspective matrix maps camera space straight to
    /// screen pixels: focal scaling, y flip, principal point at the canvas
    /// center, homogeneous divide by -z.
    pub fn new(
        pos: Vec3,
        look_at: Vec3,
        fov_radians: f32,
        near: Fixed,
        far: Fixed,
        canvas_width: i32,
        canvas_height: i32,
    ) -> Camera {
        let focal = Fixed::from_f32((canvas_height as f32 / 2.0) / (fov_radians / 2.0).tan());
        let cx = Fixed::from_int(canvas_width / 2);
        let cy = Fixed::from_int(canvas_height / 2);

        let mut m = [Fixed::ZERO; 16];
        m[0] = focal;
        m[2] = -cx;
        m[5] = -focal;
        m[6] = -cy;
        m[10] = Fixed::ONE;
        m[14] = -Fixed::ONE;

        let mut camera = Camera {
            pos,
            look_at,
            near,
            far,
            canvas_width,
            canvas_height,
            world2cam: Mat4::IDENTITY,
            persp: Mat4 { m },
        };
        camera.update_for_frame();
        camera
    }

    /// Recompute the world-to-camera matrix from the current pose. Must be
    /// called exactly once per frame before anything is projected; both
    /// derived matrices are read-only for the rest of the frame.
    pub fn update_for_frame(&mut self) {
        let back = (self.pos - self.look_at).unit();
        let right = Vec3::UP.cross(back).unit();
        let up = back.cross(right);

        let mut m = [Fixed::ZERO; 16];
        m[0] = right.x;
        m[1] = right.y;
        m[2] = right.z;
        m[3] = -right.dot(self.pos);
        m[4] = up.x;
        m[5] = up.y;
        m[6] = up.z;
        m[7] = -up.dot(self.pos);
        m[8] = back.x;
        m[9] = back.y;
        m[10] = back.z;
        m[11] = -back.dot(self.pos);
        m[15] = Fixed::ONE;
        self.world2cam = Mat4 { m };
    }

    pub fn world_to_cam(&self) -> &Mat4 {
        &self.world2cam
    }

    pub fn perspective(&self) -> &Mat4 {
        &self.persp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{HEIGHT, WIDTH};

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

    #[test]
    fn test_view_direction_maps_to_negative_z() {
        let cam = test_camera();
        let v = cam.world_to_cam().transform(cam.look_at);
        assert_eq!(v.x, Fixed::ZERO);
        assert_eq!(v.y, Fixed::ZERO);
        assert_eq!(v.z, Fixed::from_int(-10));
    }

    #[test]
    fn test_center_ray_projects_to_canvas_center() {
        let cam = test_camera();
        let cam_space = cam.world_to_cam().transform(Vec3::from_ints(0, 0, 5));
        let projected = cam.perspective().transform(cam_space);
        assert_eq!(projected.x.to_int(), WIDTH as i32 / 2);
        assert_eq!(projected.y.to_int(), HEIGHT as i32 / 2);
    }

    #[test]
    fn test_right_of_view_projects_right_of_center() {
        let cam = test_camera();
        let cam_space = cam.world_to_cam().transform(Vec3::from_ints(2, 0, 5));
        let projected = cam.perspective().transform(cam_space);
        assert!(projected.x.to_int() > WIDTH as i32 / 2);
    }

    #[test]
    fn test_update_follows_pose_change() {
        let mut cam = test_camera();
        cam.pos = Vec3::from_ints(0, 0, 20);
        cam.update_for_frame();
        let v = cam.world_to_cam().transform(Vec3::ZERO);
        assert_eq!(v.z, Fixed::from_int(-20));
    }
}
