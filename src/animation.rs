use std::io::Write;

use image::{ Delay, Frame };
use image::codecs::gif::{ GifEncoder, Repeat };

use crate::vector::Vector3;
use crate::scene::Scene;
use crate::light::Light;
use crate::shape::ShapeType;
use crate::canvas::Canvas;
use crate::error::Error;

// Orbit of the animated light around the scene focus
const ORBIT_RADIUS: f64 = 5.0;
const ORBIT_HEIGHT: f64 = 3.0;

// Delay between GIF frames, in milliseconds
const FRAME_DELAY_MS: u32 = 100;

/// What changes from one frame to the next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnimationMode {
    /// The first point light circles the scene focus.
    Orbit,

    /// Every sphere circles its initial center while bobbing up and down.
    Move,
}

/// A sequence of frames derived from one base scene.
///
/// Each frame covers `360 / frames` degrees of a full turn, so the last frame
/// leads back into the first and the animation loops.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Animation {
    pub frames: usize,
    pub mode: AnimationMode,
}

impl Animation {
    pub fn new(frames: usize, mode: AnimationMode) -> Animation {
        Animation { frames, mode }
    }

    /// The angle of `frame`, in degrees.
    pub fn angle(&self, frame: usize) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }

        360.0 * frame as f64 / self.frames as f64
    }

    /// Builds the scene shown in `frame`. The base scene is left untouched.
    pub fn frame_scene(&self, base: &Scene, frame: usize) -> Scene {
        let mut scene = base.clone();
        let angle = self.angle(frame);

        match self.mode {
            AnimationMode::Orbit => {
                let focus = scene_focus(base);
                let light = scene.lights.iter_mut().find_map(|l| match l {
                    Light::Point { position, .. } => Some(position),
                    _ => None,
                });

                if let Some(position) = light {
                    *position = orbit_light(focus, ORBIT_RADIUS, angle, ORBIT_HEIGHT);
                }
            },

            AnimationMode::Move => {
                let spheres = scene.shapes.iter_mut().filter_map(|s| match s.ty {
                    ShapeType::Sphere { ref mut center, .. } => Some(center),
                    _ => None,
                });

                for (i, center) in spheres.enumerate() {
                    *center = moved_center(*center, i, angle);
                }
            },
        }

        scene
    }
}

/// The point animations revolve around: the center of the first sphere,
/// else the centroid of all triangles, else a point in front of the camera.
pub fn scene_focus(scene: &Scene) -> Vector3 {
    let sphere = scene.shapes.iter().find_map(|s| match s.ty {
        ShapeType::Sphere { center, .. } => Some(center),
        _ => None,
    });

    if let Some(center) = sphere {
        return center;
    }

    let (sum, count) = scene.shapes.iter()
        .filter_map(|s| match s.ty {
            ShapeType::Triangle(ref ti) => Some(ti.centroid()),
            _ => None,
        })
        .fold((Vector3::zero(), 0), |(sum, n), c| (sum + c, n + 1));

    if count > 0 {
        sum * (1.0 / count as f64)
    } else {
        Vector3::new(0.0, 0.0, 5.0)
    }
}

/// Position on a horizontal circle of `radius` around `center`, at absolute
/// `height`, `angle_deg` degrees along.
pub fn orbit_light(center: Vector3, radius: f64, angle_deg: f64, height: f64)
    -> Vector3 {
    let angle = angle_deg.to_radians();

    Vector3::new(
        center.x + radius * angle.cos(),
        height,
        center.z + radius * angle.sin(),
    )
}

/// Where the `i`-th sphere, initially centered at `base`, sits at `angle`.
///
/// Later spheres circle wider and faster, and start further along.
fn moved_center(base: Vector3, i: usize, angle: f64) -> Vector3 {
    let i = i as f64;
    let radius = 1.5 + 0.5 * i;
    let speed = 1.0 + 0.3 * i;
    let phase = (angle * speed + 45.0 * i).to_radians();

    Vector3::new(
        base.x + radius * phase.cos(),
        base.y + 0.8 * phase.sin(),
        base.z + radius * phase.sin(),
    )
}

/// Writes rendered frames into a looping animated GIF.
///
/// Frames are kept until `finish`, which encodes the whole animation and
/// writes it out in one go, so a failed write is reported instead of leaving
/// a truncated file behind.
pub struct GifWriter<W: Write> {
    out: W,
    frames: Vec<Frame>,
}

impl<W: Write> GifWriter<W> {
    pub fn new(out: W) -> GifWriter<W> {
        GifWriter { out, frames: Vec::new() }
    }

    pub fn add_frame(&mut self, canvas: &Canvas) {
        self.frames.push(Frame::from_parts(canvas.to_rgba_image(), 0, 0,
            Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1)));
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Encodes every frame, writes the GIF and returns the flushed writer.
    pub fn finish(mut self) -> Result<W, Error> {
        let mut gif: Vec<u8> = Vec::new();
        {
            // The trailer is written when the encoder is dropped.
            let mut encoder = GifEncoder::new(&mut gif);
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(self.frames.drain(..))?;
        }

        self.out.write_all(&gif)?;
        self.out.flush()?;

        Ok(self.out)
    }
}

#[cfg(test)]
use crate::shape::Shape;

#[cfg(test)]
fn two_spheres() -> Scene {
    let mut scene = Scene::new();
    scene.shapes.push(Shape::sphere(Vector3::new(-2.0, 0.0, 6.0), 0.5));
    scene
}

#[test]
fn frame_angles_cover_one_turn() {
    let a = Animation::new(36, AnimationMode::Orbit);

    assert_eq!(a.angle(0), 0.0);
    assert_eq!(a.angle(9), 90.0);
    assert_eq!(a.angle(35), 350.0);
}

#[test]
fn orbit_moves_first_point_light() {
    let base = two_spheres();
    let a = Animation::new(4, AnimationMode::Orbit);

    let first = a.frame_scene(&base, 0);
    let second = a.frame_scene(&base, 1);

    let position = |s: &Scene| s.lights.iter().find_map(|l| match *l {
        Light::Point { position, .. } => Some(position),
        _ => None,
    });

    assert_eq!(position(&first), Some(Vector3::new(5.0, 3.0, 4.0)));
    assert_eq!(position(&second), Some(Vector3::new(0.0, 3.0, 9.0)));
    assert_eq!(first.shapes, base.shapes);
    assert_eq!(first.lights[0], base.lights[0]);
    assert_eq!(first.lights[2], base.lights[2]);
}

#[test]
fn frame_scene_leaves_base_untouched() {
    let base = two_spheres();
    let copy = base.clone();

    for &mode in [AnimationMode::Orbit, AnimationMode::Move].iter() {
        let a = Animation::new(8, mode);
        for frame in 0..8 {
            a.frame_scene(&base, frame);
        }
    }

    assert_eq!(base, copy);
}

#[test]
fn move_circles_each_sphere() {
    let base = two_spheres();
    let moved = Animation::new(36, AnimationMode::Move).frame_scene(&base, 0);

    let h = 2.0f64.sqrt() / 2.0;
    let centers: Vec<Vector3> = moved.shapes.iter().filter_map(|s| match s.ty {
        ShapeType::Sphere { center, .. } => Some(center),
        _ => None,
    }).collect();

    assert_eq!(centers[0], Vector3::new(1.5, 0.0, 4.0));
    assert_eq!(centers[1], Vector3::new(-2.0 + 2.0 * h, 0.8 * h, 6.0 + 2.0 * h));
    assert_eq!(moved.lights, base.lights);
}

#[test]
fn focus_falls_back_to_triangles_then_default() {
    let mut scene = Scene::empty();
    assert_eq!(scene_focus(&scene), Vector3::new(0.0, 0.0, 5.0));

    scene.shapes.push(Shape::triangle(Vector3::zero(),
        Vector3::new(3.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 6.0)));
    scene.shapes.push(Shape::triangle(Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0)));
    assert_eq!(scene_focus(&scene), Vector3::new(1.0, 1.0, 1.5));

    scene.shapes.push(Shape::sphere(Vector3::new(7.0, 8.0, 9.0), 1.0));
    assert_eq!(scene_focus(&scene), Vector3::new(7.0, 8.0, 9.0));
}

#[cfg(test)]
fn two_frame_gif<W: Write>(out: W) -> Result<W, Error> {
    let mut gif = GifWriter::new(out);
    let mut canvas = Canvas::new(4, 3);
    gif.add_frame(&canvas);
    canvas.write_pixel(1, 1, &crate::color::Color::white());
    gif.add_frame(&canvas);

    assert_eq!(gif.frame_count(), 2);
    gif.finish()
}

#[test]
fn gif_has_header_and_trailer() {
    let out = two_frame_gif(Vec::new()).expect("Writing to a Vec should not fail.");

    assert!(out.starts_with(b"GIF89a"));
    assert_eq!(out.last(), Some(&0x3b));
}

/// Accepts `room` bytes, then refuses to write.
#[cfg(test)]
struct ShortWriter {
    written: Vec<u8>,
    room: usize,
}

#[cfg(test)]
impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.room - self.written.len());
        if n == 0 && !buf.is_empty() {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        }

        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn failed_final_write_is_reported() {
    let full = two_frame_gif(Vec::new()).expect("Writing to a Vec should not fail.");
    let short = ShortWriter { written: Vec::new(), room: full.len() - 1 };

    match two_frame_gif(short) {
        Err(Error::Io(_)) => (),
        other => panic!("Expected an I/O error, got {:?}", other.map(|w| w.written.len())),
    }
}
