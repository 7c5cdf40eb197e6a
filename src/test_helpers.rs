//! Synthetic fixtures shared by the unit tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, codecs::jpeg::JpegEncoder};

pub const TAG_MAKE: u16 = 0x010f;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_SOFTWARE: u16 = 0x0131;
pub const TAG_DATE_TIME: u16 = 0x0132;

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// High-frequency pattern that JPEG cannot reproduce exactly.
pub fn textured_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = (x * 37 + y * 91) ^ (x * y);
        Rgb([(v % 256) as u8, ((v * 3) % 256) as u8, ((x * 7 + y) % 256) as u8])
    })
}

pub fn jpeg_bytes(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .unwrap();
    buf
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

/// Little-endian TIFF block holding ASCII tags in IFD0.
pub fn tiff_with_ascii_tags(tags: &[(u16, &str)]) -> Vec<u8> {
    let mut tags = tags.to_vec();
    tags.sort_by_key(|(tag, _)| *tag);

    let ifd_len = 2 + 12 * tags.len() + 4;
    let mut data_offset = 8 + ifd_len;
    let mut ifd = Vec::with_capacity(ifd_len);
    let mut data = Vec::new();

    ifd.extend_from_slice(&(tags.len() as u16).to_le_bytes());
    for (tag, value) in &tags {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);

        ifd.extend_from_slice(&tag.to_le_bytes());
        ifd.extend_from_slice(&2u16.to_le_bytes());
        ifd.extend_from_slice(&(bytes.len() as u32).to_le_bytes());

        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            ifd.extend_from_slice(&bytes);
        } else {
            ifd.extend_from_slice(&(data_offset as u32).to_le_bytes());
            if bytes.len() % 2 == 1 {
                bytes.push(0);
            }
            data_offset += bytes.len();
            data.extend_from_slice(&bytes);
        }
    }
    ifd.extend_from_slice(&0u32.to_le_bytes());

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&ifd);
    tiff.extend_from_slice(&data);
    tiff
}

/// A small JPEG with an EXIF APP1 segment spliced in right after SOI.
pub fn jpeg_with_exif(tags: &[(u16, &str)]) -> Vec<u8> {
    let jpeg = jpeg_bytes(&textured_rgb(16, 16), 90);
    let tiff = tiff_with_ascii_tags(tags);

    let mut app1 = vec![0xff, 0xe1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

pub fn camera_jpeg() -> Vec<u8> {
    jpeg_with_exif(&[
        (TAG_MAKE, "Acme Optics"),
        (TAG_MODEL, "Lens 3000"),
        (TAG_SOFTWARE, "Firmware 1.2"),
    ])
}
