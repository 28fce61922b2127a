use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::Path;

use image::{ ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage };

use crate::color::Color;
use crate::error::Error;

// Longest line allowed in a plain PPM file
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// The canvas stores the result of one render: one 8-bit RGB triple per
/// pixel, in rows from top to bottom. Once the render finishes, the canvas
/// can be written out as a PPM file or, through the `image` crate, any other
/// format it knows.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<[u8; 3]>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![[0, 0, 0]; width * height]
        }
    }

    /// All pixels, row after row.
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// All pixels, row after row, for renderers filling whole rows at once.
    pub fn pixels_mut(&mut self) -> &mut [[u8; 3]] {
        &mut self.pixels
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed. The color is clamped and rounded to
    /// 8-bit channels.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use phong_tracer::color::Color;
    /// # use phong_tracer::canvas::Canvas;
    /// let purple = Color::rgb(255.0, 0.0, 255.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2), Some([255, 0, 255]));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = pixel.to_rgb8();
    }

    /// Reads a pixel from a location on the `Canvas`.
    ///
    /// If the specified pixel location is out-of-bounds, `None` is returned.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Lines are kept within 70 columns. If a value would cross the 70 column
    /// mark, it is moved to the next line over.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // Write PPM header, as well as metadata
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?; // Maximum color value

        let mut col = 0;
        for value in self.pixels.iter().flat_map(|p| p.iter()) {
            let value = value.to_string();

            if col > 0 && col + 1 + value.len() > PPM_LINE_WIDTH {
                writeln!(out)?;
                col = 0;
            } else if col > 0 {
                write!(out, " ")?;
                col += 1;
            }

            write!(out, "{}", value)?;
            col += value.len();
        }

        // Terminate the PPM file with a newline
        if col != 0 {
            writeln!(out)?;
        }

        Ok(())
    }

    /// Saves the canvas to a file.
    ///
    /// `.ppm` files are written by `write_ppm`; any other extension is handed
    /// to the `image` crate, which picks the format from it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let is_ppm = path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut out = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut out)?;
            out.flush()?;
        } else {
            self.to_rgb_image().save(path)?;
        }

        Ok(())
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(self.pixels[y as usize * self.width + x as usize])
        })
    }

    /// Opaque RGBA copy of the canvas, as animation frames want it.
    pub fn to_rgba_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let [r, g, b] = self.pixels[y as usize * self.width + x as usize];
            Rgba([r, g, b, 255])
        })
    }
}

#[cfg(test)]
fn ppm_string(c: &Canvas) -> String {
    let mut out = Vec::new();
    c.write_ppm(&mut out).expect("Writing to a Vec should not fail.");
    String::from_utf8(out).expect("PPM output should be ASCII.")
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.pixels().len(), 200);
    assert!(c.pixels().iter().all(|&p| p == [0, 0, 0]));
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::white());
    c.write_pixel(0, 2, &Color::white());

    assert_eq!(c.read_pixel(2, 0), None);
    assert!(c.pixels().iter().all(|&p| p == [0, 0, 0]));
}

#[test]
fn write_pixel_clamps_and_rounds() {
    let mut c = Canvas::new(1, 1);
    c.write_pixel(0, 0, &Color::rgb(-3.0, 127.5, 400.0));

    assert_eq!(c.read_pixel(0, 0), Some([0, 128, 255]));
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(0, 0, &Color::rgb(255.0, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.0, 255.0));

    let ppm = ppm_string(&c);
    let mut lines = ppm.lines();

    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("3 2"));
    assert_eq!(lines.next(), Some("255"));
    assert_eq!(lines.next(),
        Some("255 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 255"));
    assert_eq!(lines.next(), None);
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(255.0, 204.0, 153.0));
        }
    }

    let ppm = ppm_string(&c);
    let body: Vec<&str> = ppm.lines().skip(3).collect();

    assert!(body.iter().all(|l| l.len() <= 70));
    assert_eq!(body[0],
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(body.iter().map(|l| l.split(' ').count()).sum::<usize>(), 60);
    assert!(ppm.ends_with('\n'));
}

#[test]
fn rgb_image_matches_canvas() {
    let mut c = Canvas::new(2, 1);
    c.write_pixel(1, 0, &Color::rgb(10.0, 20.0, 30.0));

    let img = c.to_rgb_image();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0), &Rgb([10, 20, 30]));
    assert_eq!(c.to_rgba_image().get_pixel(1, 0), &Rgba([10, 20, 30, 255]));
}
