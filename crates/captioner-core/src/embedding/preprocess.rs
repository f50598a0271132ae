//! Image preprocessing for the VGG16 feature extractor.
//!
//! VGG16 (Keras "caffe" preprocessing) expects:
//! - Input size: 224×224 pixels
//! - Channel order: BGR
//! - Normalization: per-channel ImageNet mean subtracted, no scaling
//! - Tensor layout: NHWC [batch, height, width, channels]

use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels.
pub const CHANNELS: usize = 3;

/// ImageNet channel means in BGR order.
const BGR_MEAN: [f32; CHANNELS] = [103.939, 116.779, 123.68];

/// Preprocess an image for VGG16 inference.
///
/// Resizes to `image_size × image_size` (bicubic, aspect ratio not kept),
/// coerces any color mode to RGB, reorders to BGR, subtracts the channel means
/// and returns an NHWC tensor suitable for ONNX Runtime.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let resized = image.resize_exact(
        image_size,
        image_size,
        image::imageops::FilterType::CatmullRom,
    );
    let rgb = resized.to_rgb8();

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, CHANNELS));

    // NHWC keeps pixels contiguous, so the raw RGB buffer maps 1:1 onto the
    // tensor with only the channel order flipped.
    let raw = rgb.as_raw();
    for ((y, x), pixel) in (0..size)
        .flat_map(|y| (0..size).map(move |x| (y, x)))
        .zip(raw.chunks_exact(CHANNELS))
    {
        for c in 0..CHANNELS {
            let value = pixel[CHANNELS - 1 - c] as f32;
            tensor[[0, y, x, c]] = value - BGR_MEAN[c];
        }
    }

    tensor
}
